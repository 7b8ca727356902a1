use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::PrescriptionRecord;

pub fn insert_prescription(conn: &Connection, record: &PrescriptionRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (patient_id, name, age, gender, visit_date, doctor_notes, raw_ocr_text)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.patient_id,
            record.name,
            record.age,
            record.gender,
            record.visit_date.map(|d| d.format("%Y-%m-%d").to_string()),
            record.doctor_notes,
            record.raw_ocr_text,
        ],
    )?;
    Ok(())
}

pub fn get_prescription(
    conn: &Connection,
    patient_id: &str,
) -> Result<Option<PrescriptionRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT patient_id, name, age, gender, visit_date, doctor_notes, raw_ocr_text
         FROM prescriptions WHERE patient_id = ?1"
    )?;

    let result = stmt.query_row(params![patient_id], |row| {
        Ok(PrescriptionRow {
            patient_id: row.get::<_, String>(0)?,
            name: row.get::<_, Option<String>>(1)?,
            age: row.get::<_, Option<String>>(2)?,
            gender: row.get::<_, Option<String>>(3)?,
            visit_date: row.get::<_, Option<String>>(4)?,
            doctor_notes: row.get::<_, Option<String>>(5)?,
            raw_ocr_text: row.get::<_, String>(6)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(prescription_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// Internal row type for PrescriptionRecord mapping
struct PrescriptionRow {
    patient_id: String,
    name: Option<String>,
    age: Option<String>,
    gender: Option<String>,
    visit_date: Option<String>,
    doctor_notes: Option<String>,
    raw_ocr_text: String,
}

fn prescription_from_row(row: PrescriptionRow) -> Result<PrescriptionRecord, DatabaseError> {
    let visit_date = match row.visit_date {
        Some(d) => Some(NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|_| {
            DatabaseError::InvalidRow {
                field: "visit_date".into(),
                value: d.clone(),
            }
        })?),
        None => None,
    };

    Ok(PrescriptionRecord {
        patient_id: row.patient_id,
        name: row.name,
        age: row.age,
        gender: row.gender,
        visit_date,
        doctor_notes: row.doctor_notes,
        raw_ocr_text: row.raw_ocr_text,
    })
}
