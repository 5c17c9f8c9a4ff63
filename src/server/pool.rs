//! # Pool de Workers con Admisión
//! src/server/pool.rs
//!
//! Pool acotado de threads al estilo de un "cached thread pool":
//!
//! - `core` threads quedan residentes una vez creados.
//! - Por encima de `core` se crean threads bajo demanda que terminan tras
//!   `keep_alive` sin trabajo.
//! - Nunca hay más de `max` conexiones activas (encoladas o en proceso).
//!   [`WorkerPool::try_execute`] rechaza el trabajo cuando se alcanza el
//!   techo y se lo devuelve al caller, que responde 503.
//!
//! Todo el estado compartido (cola, activos, threads, ociosos) vive bajo un
//! único `Mutex` con un `Condvar` para despertar workers.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error};

/// Trabajo que ejecuta un worker
///
/// Cualquier closure `FnOnce() + Send` es una tarea. Un tipo propio que
/// implementa `Task` permite recuperar su estado cuando el pool lo rechaza.
pub trait Task: Send + 'static {
    fn run(self: Box<Self>);
}

impl<F> Task for F
where
    F: FnOnce() + Send + 'static,
{
    fn run(self: Box<Self>) {
        (*self)()
    }
}

type Job = Box<dyn Task>;

/// Tamaños del pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Threads residentes
    pub core: usize,

    /// Techo de conexiones activas (y de threads)
    pub max: usize,

    /// Tiempo que un thread extra espera trabajo antes de terminar
    pub keep_alive: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            core: 5,
            max: 50,
            keep_alive: Duration::from_secs(60),
        }
    }
}

/// Estado interno del pool
struct PoolState {
    queue: VecDeque<Job>,

    /// Trabajos admitidos que aún no terminaron
    active: usize,

    /// Threads vivos
    threads: usize,

    /// Threads esperando trabajo
    idle: usize,

    shutdown: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    available: Condvar,
    config: PoolConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Snapshot del estado del pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub active: usize,
    pub threads: usize,
    pub idle: usize,
}

/// Pool acotado de workers
pub struct WorkerPool {
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Crea un pool vacío; los threads se crean a medida que llega trabajo
    pub fn new(config: PoolConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PoolState {
                    queue: VecDeque::new(),
                    active: 0,
                    threads: 0,
                    idle: 0,
                    shutdown: false,
                }),
                available: Condvar::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> PoolConfig {
        self.shared.config
    }

    /// Intenta admitir un trabajo
    ///
    /// Retorna `Err(task)` sin ejecutarla si ya hay `max` trabajos activos.
    /// Un trabajo admitido nunca espera detrás de otro: si no hay un thread
    /// ocioso para él, se crea uno.
    pub fn try_execute<T: Task>(&self, task: T) -> Result<(), T> {
        let mut state = self.shared.lock();

        if state.shutdown || state.active >= self.shared.config.max {
            return Err(task);
        }

        state.active += 1;
        state.queue.push_back(Box::new(task));

        if state.queue.len() > state.idle && state.threads < self.shared.config.max {
            state.threads += 1;
            let id = state.threads;
            drop(state);
            self.spawn_worker(id);
        } else {
            drop(state);
            self.shared.available.notify_one();
        }

        Ok(())
    }

    /// Trabajos activos (encolados o en ejecución)
    pub fn active(&self) -> usize {
        self.shared.lock().active
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.shared.lock();
        PoolStats {
            active: state.active,
            threads: state.threads,
            idle: state.idle,
        }
    }

    fn spawn_worker(&self, id: usize) {
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || worker_loop(shared));

        if let Err(e) = spawned {
            // Sin thread nuevo el trabajo lo toma el próximo worker libre
            error!(error = %e, "failed to spawn worker thread");
            self.shared.lock().threads -= 1;
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.available.notify_all();
    }
}

/// Ciclo de vida de un thread del pool
fn worker_loop(shared: Arc<Shared>) {
    let mut state = shared.lock();

    loop {
        if let Some(job) = state.queue.pop_front() {
            drop(state);

            if panic::catch_unwind(AssertUnwindSafe(|| job.run())).is_err() {
                error!("worker job panicked");
            }

            state = shared.lock();
            state.active -= 1;
            continue;
        }

        if state.shutdown {
            break;
        }

        state.idle += 1;
        if state.threads > shared.config.core {
            let (guard, timeout) = shared
                .available
                .wait_timeout(state, shared.config.keep_alive)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
            state.idle -= 1;

            if timeout.timed_out() && state.queue.is_empty() && state.threads > shared.config.core {
                debug!("idle worker exiting");
                break;
            }
        } else {
            state = shared
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            state.idle -= 1;
        }
    }

    state.threads -= 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Instant;

    fn config(core: usize, max: usize) -> PoolConfig {
        PoolConfig {
            core,
            max,
            keep_alive: Duration::from_millis(50),
        }
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_executes_jobs() {
        let pool = WorkerPool::new(config(2, 4));
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let counter = Arc::clone(&counter);
            assert!(pool
                .try_execute(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .is_ok());
        }

        assert!(wait_until(|| counter.load(Ordering::SeqCst) == 4));
        assert!(wait_until(|| pool.active() == 0));
    }

    #[test]
    fn test_rejects_above_ceiling() {
        let pool = WorkerPool::new(config(1, 2));
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Arc::new(Mutex::new(release_rx));

        for _ in 0..2 {
            let rx = Arc::clone(&release_rx);
            assert!(pool
                .try_execute(move || {
                    let _ = rx.lock().unwrap().recv();
                })
                .is_ok());
        }
        assert_eq!(pool.active(), 2);

        // El tercero se devuelve sin ejecutar
        let ran = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&ran);
        let rejected = pool.try_execute(move || {
            flag.fetch_add(1, Ordering::SeqCst);
        });
        assert!(rejected.is_err());

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        assert!(wait_until(|| pool.active() == 0));
        assert_eq!(ran.load(Ordering::SeqCst), 0);

        // Con capacidad libre vuelve a admitir
        let flag = Arc::clone(&ran);
        assert!(pool
            .try_execute(move || {
                flag.fetch_add(1, Ordering::SeqCst);
            })
            .is_ok());
        assert!(wait_until(|| ran.load(Ordering::SeqCst) == 1));
    }

    #[test]
    fn test_admitted_jobs_run_concurrently() {
        let pool = WorkerPool::new(config(1, 3));
        let started = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Arc::new(Mutex::new(release_rx));

        for _ in 0..3 {
            let started = Arc::clone(&started);
            let rx = Arc::clone(&release_rx);
            pool.try_execute(move || {
                started.fetch_add(1, Ordering::SeqCst);
                let _ = rx.lock().unwrap().recv();
            })
            .ok()
            .unwrap();
        }

        // Los tres arrancan aunque core sea 1
        assert!(wait_until(|| started.load(Ordering::SeqCst) == 3));

        for _ in 0..3 {
            release_tx.send(()).unwrap();
        }
        assert!(wait_until(|| pool.active() == 0));
    }

    #[test]
    fn test_extra_threads_retire_after_keep_alive() {
        let pool = WorkerPool::new(config(1, 4));
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Arc::new(Mutex::new(release_rx));

        for _ in 0..3 {
            let rx = Arc::clone(&release_rx);
            pool.try_execute(move || {
                let _ = rx.lock().unwrap().recv();
            })
            .ok()
            .unwrap();
        }
        assert_eq!(pool.stats().threads, 3);

        for _ in 0..3 {
            release_tx.send(()).unwrap();
        }

        assert!(wait_until(|| pool.stats().threads == 1));
        assert_eq!(pool.active(), 0);
    }

    #[test]
    fn test_rejected_task_is_handed_back() {
        struct Tagged(u32);

        impl Task for Tagged {
            fn run(self: Box<Self>) {
                thread::sleep(Duration::from_millis(200));
            }
        }

        let pool = WorkerPool::new(config(0, 1));
        assert!(pool.try_execute(Tagged(1)).is_ok());

        match pool.try_execute(Tagged(2)) {
            Err(Tagged(tag)) => assert_eq!(tag, 2),
            Ok(()) => panic!("second task should be rejected"),
        }

        assert!(wait_until(|| pool.active() == 0));
    }

    #[test]
    fn test_panicking_job_releases_slot() {
        let pool = WorkerPool::new(config(1, 1));

        pool.try_execute(|| panic!("boom")).ok().unwrap();
        assert!(wait_until(|| pool.active() == 0));

        let ran = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&ran);
        pool.try_execute(move || {
            flag.fetch_add(1, Ordering::SeqCst);
        })
        .ok()
        .unwrap();
        assert!(wait_until(|| ran.load(Ordering::SeqCst) == 1));
    }
}
