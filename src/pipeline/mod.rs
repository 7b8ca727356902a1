pub mod extraction; // OCR collaborator + record orchestrator
pub mod structuring; // Field, date and notes heuristics
