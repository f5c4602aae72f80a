pub mod preparation; // Content Preparer: file → image handle or normalized text
pub mod analysis; // Orchestrator: prompt → remote call with retries → outcome
