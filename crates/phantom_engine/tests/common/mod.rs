#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use phantom_core::{JobId, Marker};
use phantom_engine::{write_atomic, ConsoleSink, Engine, EngineError, EnginePage, PageLayout};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// How fake pages respond to engine calls.
#[derive(Debug, Clone)]
pub struct Behaviour {
    pub open_ok: bool,
    pub load_ok: bool,
    pub load_delay: Duration,
    /// Delay between script injection and the markers it logs.
    pub script_delay: Duration,
    pub html: Result<String, String>,
    pub print_ok: bool,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            open_ok: true,
            load_ok: true,
            load_delay: Duration::from_millis(100),
            script_delay: Duration::from_millis(500),
            html: Ok("<html><body><span id=\"id1\">bar</span> <span id=\"id2\">baz</span></body></html>".to_string()),
            print_ok: true,
        }
    }
}

/// In-process engine that pretends to run scripts: every marker literal
/// found in the injected source is logged to the console after
/// `script_delay`.
#[derive(Clone, Default)]
pub struct FakeEngine {
    behaviour: Behaviour,
    per_target_delay: HashMap<String, Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeEngine {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            ..Self::default()
        }
    }

    /// Overrides the script delay for pages loading `target`.
    pub fn with_delay_for(mut self, target: &str, delay: Duration) -> Self {
        self.per_target_delay.insert(target.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, job_id: JobId) -> Vec<String> {
        let prefix = format!("{job_id}:");
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }
}

#[async_trait::async_trait]
impl Engine for FakeEngine {
    async fn open_page(
        &self,
        job_id: JobId,
        console: Arc<dyn ConsoleSink>,
    ) -> Result<Arc<dyn EnginePage>, EngineError> {
        self.calls.lock().unwrap().push(format!("{job_id}:open"));
        if !self.behaviour.open_ok {
            return Err(EngineError::AlreadyClosed);
        }
        Ok(Arc::new(FakePage {
            job_id,
            engine: self.clone(),
            console,
            target: Mutex::new(None),
        }))
    }
}

struct FakePage {
    job_id: JobId,
    engine: FakeEngine,
    console: Arc<dyn ConsoleSink>,
    target: Mutex<Option<String>>,
}

impl FakePage {
    fn note(&self, call: &str) {
        self.engine
            .calls
            .lock()
            .unwrap()
            .push(format!("{}:{call}", self.job_id));
    }
}

#[async_trait::async_trait]
impl EnginePage for FakePage {
    async fn load(&self, url: &str) -> Result<(), EngineError> {
        self.note("load");
        *self.target.lock().unwrap() = Some(url.to_string());
        tokio::time::sleep(self.engine.behaviour.load_delay).await;
        if self.engine.behaviour.load_ok {
            Ok(())
        } else {
            Err(EngineError::NavigationFailed {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
        }
    }

    async fn run_script(&self, source: &str) -> Result<(), EngineError> {
        self.note("script");
        let target = self.target.lock().unwrap().clone().unwrap_or_default();
        let delay = self
            .engine
            .per_target_delay
            .get(&target)
            .copied()
            .unwrap_or(self.engine.behaviour.script_delay);
        let markers: Vec<Marker> = Marker::ALL
            .into_iter()
            .filter(|marker| source.contains(marker.as_str()))
            .collect();

        let console = self.console.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            console.emit("page script running".to_string());
            for marker in markers {
                console.emit(format!("[page] {marker}"));
            }
        });
        Ok(())
    }

    async fn serialize(&self) -> Result<String, EngineError> {
        self.note("serialize");
        self.engine
            .behaviour
            .html
            .clone()
            .map_err(EngineError::CaptureFailed)
    }

    async fn print(&self, target: &Path, layout: &PageLayout) -> Result<(), EngineError> {
        self.note("print");
        assert_eq!(*layout, PageLayout::A4);
        if !self.engine.behaviour.print_ok {
            return Err(EngineError::PrintFailed("printer on fire".to_string()));
        }
        write_atomic(target, b"%PDF-1.4 fake")?;
        Ok(())
    }

    async fn close(&self) {
        self.note("close");
    }
}
