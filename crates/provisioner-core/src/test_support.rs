//! Shared helpers for unit tests

use crate::id::IdGenerator;
use std::sync::Mutex;

/// Generator returning either a fixed id or a numbered sequence, recording
/// every call
pub struct RecordingGenerator {
    fixed: Option<String>,
    issued: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn fixed(id: &str) -> Self {
        Self {
            fixed: Some(id.to_string()),
            issued: Mutex::new(Vec::new()),
        }
    }

    pub fn sequence() -> Self {
        Self {
            fixed: None,
            issued: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.issued.lock().unwrap().len()
    }

    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }
}

impl IdGenerator for RecordingGenerator {
    fn new_id(&self) -> String {
        let mut issued = self.issued.lock().unwrap();
        let id = match &self.fixed {
            Some(id) => id.clone(),
            None => format!("id-{}", issued.len() + 1),
        };
        issued.push(id.clone());
        id
    }
}
