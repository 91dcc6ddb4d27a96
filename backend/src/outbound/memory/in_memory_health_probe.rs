//! Switchable health probe for store-less runs and tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::ports::HealthProbe;

/// Reports whatever reachability it was last told.
#[derive(Debug)]
pub struct InMemoryHealthProbe {
    component: &'static str,
    reachable: AtomicBool,
}

impl InMemoryHealthProbe {
    pub fn new(component: &'static str, reachable: bool) -> Self {
        Self {
            component,
            reachable: AtomicBool::new(reachable),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl HealthProbe for InMemoryHealthProbe {
    fn component(&self) -> &'static str {
        self.component
    }

    async fn ping(&self) -> Result<bool, Error> {
        Ok(self.reachable.load(Ordering::SeqCst))
    }
}
