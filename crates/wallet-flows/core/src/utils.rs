use std::{future::Future, ops::ControlFlow, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::debug;

pub(crate) async fn run_with_shutdown<F, T>(
    mut shutdown: watch::Receiver<()>,
    exit_message: &str,
    future: F,
) -> Option<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        t = future => {
          Some(t)
        }
        _ = shutdown.changed() => {
            debug!("{exit_message}");
            None
        }
    }
}

/// Applies `reset` to the watched state when dropped, on every exit path of
/// the scope holding it
pub(crate) struct StateGuard<'a, T> {
    state: &'a watch::Sender<T>,
    reset: fn(&mut T),
}

impl<'a, T> StateGuard<'a, T> {
    pub(crate) fn new(state: &'a watch::Sender<T>, reset: fn(&mut T)) -> Self {
        Self { state, reset }
    }
}

impl<T> Drop for StateGuard<'_, T> {
    fn drop(&mut self) {
        self.state.send_modify(self.reset);
    }
}

/// A spawned loop owned by a screen. Dropping it signals shutdown and aborts
/// the task, so nothing it started completes afterwards.
pub(crate) struct BackgroundTask {
    shutdown_sender: Option<watch::Sender<()>>,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    /// Runs `tick` every `period`, first after one full period unless
    /// `immediate` is set. The loop ends when `tick` breaks or on shutdown.
    pub(crate) fn spawn_periodic<F, Fut>(
        name: &'static str,
        period: Duration,
        immediate: bool,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send,
    {
        let (shutdown_sender, shutdown_receiver) = watch::channel(());

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            if !immediate {
                // The first tick completes immediately
                ticker.tick().await;
            }
            loop {
                let ticked =
                    run_with_shutdown(shutdown_receiver.clone(), "Shutdown received", async {
                        ticker.tick().await;
                        tick().await
                    })
                    .await;
                match ticked {
                    Some(ControlFlow::Continue(())) => {}
                    Some(ControlFlow::Break(())) => {
                        debug!("{name} loop finished");
                        break;
                    }
                    None => {
                        debug!("{name} loop cancelled");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown_sender: Some(shutdown_sender),
            handle,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for BackgroundTask {
    fn drop(&mut self) {
        self.shutdown_sender.take();
        self.handle.abort();
    }
}
