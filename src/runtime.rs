use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::{CpuPool, ThreadPoolExecutor};
use parking_lot::RwLock;
use std::sync::Arc;

/// The process-wide default pool.
pub struct Runtime {
    pub(crate) pool: Arc<CpuPool>,
    config: Config,
}

impl Runtime {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let pool = CpuPool::new(&config)?;

        Ok(Self {
            pool: Arc::new(pool),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn executor(&self) -> ThreadPoolExecutor {
        ThreadPoolExecutor::from_pool(self.pool.clone())
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("num_threads", &self.pool.num_threads())
            .finish()
    }
}

static GLOBAL_RUNTIME: RwLock<Option<Runtime>> = RwLock::new(None);

/// Start the default runtime with [`Config::default`].
pub fn init() -> Result<()> {
    init_with_config(Config::default())
}

pub fn init_with_config(config: Config) -> Result<()> {
    let mut runtime = GLOBAL_RUNTIME.write();

    if runtime.is_some() {
        return Err(Error::AlreadyInitialized);
    }

    let rt = Runtime::new(config)?;
    tracing::debug!(threads = rt.pool.num_threads(), "runtime initialized");
    *runtime = Some(rt);

    Ok(())
}

/// An executor on the default runtime's pool.
///
/// Executors already handed out keep the pool alive across [`shutdown`].
pub fn current_executor() -> Result<ThreadPoolExecutor> {
    GLOBAL_RUNTIME
        .read()
        .as_ref()
        .map(Runtime::executor)
        .ok_or(Error::NotInitialized)
}

/// Tear down the default runtime. Does nothing if it was never started.
pub fn shutdown() {
    let rt = GLOBAL_RUNTIME.write().take();
    if rt.is_some() {
        tracing::debug!("runtime shut down");
    }
}
