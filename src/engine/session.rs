use super::{ProgressScript, ProgressState, SessionPhase};
use crate::api::FrameGenerator;
use crate::config::{EngineConfig, GenerationRequest, OverlapPolicy};
use crate::error::{Result, StoryboardError};
use crate::scene::SceneBoard;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// `tokio::time::interval` 不接受零周期
const MIN_STEP_INTERVAL: Duration = Duration::from_millis(1);

struct ActiveRun {
    id: u64,
    token: CancellationToken,
}

struct Shared {
    phase: SessionPhase,
    progress: ProgressState,
    run: Option<ActiveRun>,
    next_run_id: u64,
}

/// 同一时间只持有一个生成任务及其定时器
///
/// 会话被丢弃时取消进行中的任务
pub struct GenerationSession<G> {
    generator: Arc<G>,
    script: Arc<ProgressScript>,
    step_interval: Duration,
    completion_delay: Duration,
    overlap: OverlapPolicy,
    shared: Arc<Mutex<Shared>>,
}

impl<G: FrameGenerator> GenerationSession<G> {
    pub fn new(generator: G, script: ProgressScript, config: &EngineConfig) -> Self {
        Self {
            generator: Arc::new(generator),
            script: Arc::new(script),
            step_interval: config.step_interval.max(MIN_STEP_INTERVAL),
            completion_delay: config.completion_delay,
            overlap: config.overlap,
            shared: Arc::new(Mutex::new(Shared {
                phase: SessionPhase::Idle,
                progress: ProgressState::default(),
                run: None,
                next_run_id: 0,
            })),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.lock().phase.clone()
    }

    pub fn progress(&self) -> ProgressState {
        self.shared.lock().progress.clone()
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.shared.lock().phase, SessionPhase::Generating { .. })
    }

    /// 开始生成，需在 Tokio 运行时中调用
    ///
    /// 每完成一步调用 `on_progress`；任务结束时 `on_complete` 恰好调用一次，
    /// 被取消时不会调用
    pub fn start<P, C>(&self, request: GenerationRequest, on_progress: P, on_complete: C) -> Result<()>
    where
        P: FnMut(&ProgressState) + Send + 'static,
        C: FnOnce(Result<SceneBoard>) + Send + 'static,
    {
        if request.trimmed_text().is_none() {
            warn!("Refusing to generate: input text is empty");
            return Err(StoryboardError::MissingInput);
        }
        let handle = Handle::try_current()
            .map_err(|e| StoryboardError::GenerationError(format!("no async runtime: {}", e)))?;

        let (run_id, token) = {
            let mut shared = self.shared.lock();
            if let Some(current) = shared.run.take() {
                match self.overlap {
                    OverlapPolicy::Reject => {
                        shared.run = Some(current);
                        return Err(StoryboardError::AlreadyGenerating);
                    }
                    OverlapPolicy::Restart => {
                        info!("Restarting generation, cancelling run {}", current.id);
                        current.token.cancel();
                    }
                }
            }

            let run_id = shared.next_run_id;
            shared.next_run_id += 1;
            let token = CancellationToken::new();
            shared.run = Some(ActiveRun {
                id: run_id,
                token: token.clone(),
            });
            shared.phase = SessionPhase::Generating { stage: 0 };
            shared.progress = self.script.initial_state();
            (run_id, token)
        };

        info!(
            "Starting generation run {}: {} frames, {} style, {} characters",
            run_id,
            request.frame_count.get(),
            request.style,
            request.text.chars().count()
        );

        let job = Job {
            run_id,
            token,
            shared: Arc::clone(&self.shared),
            script: Arc::clone(&self.script),
            generator: Arc::clone(&self.generator),
            step_interval: self.step_interval,
            completion_delay: self.completion_delay,
        };
        handle.spawn(job.run(request, on_progress, on_complete));
        Ok(())
    }

    /// 停止进行中的任务，进度保持不变，会话回到 `Idle`
    ///
    /// 没有任务时返回 `false`
    pub fn cancel(&self) -> bool {
        let mut shared = self.shared.lock();
        match shared.run.take() {
            Some(run) => {
                run.token.cancel();
                shared.phase = SessionPhase::Idle;
                info!("Cancelled generation run {} at {}%", run.id, shared.progress.percent);
                true
            }
            None => false,
        }
    }

    /// 运行一次完整任务并返回分镜
    pub async fn generate<P>(&self, request: GenerationRequest, on_progress: P) -> Result<SceneBoard>
    where
        P: FnMut(&ProgressState) + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.start(request, on_progress, move |outcome| {
            let _ = tx.send(outcome);
        })?;
        rx.await.map_err(|_| StoryboardError::Cancelled)?
    }
}

impl<G> Drop for GenerationSession<G> {
    fn drop(&mut self) {
        if let Some(run) = self.shared.lock().run.take() {
            run.token.cancel();
        }
    }
}

struct Job<G> {
    run_id: u64,
    token: CancellationToken,
    shared: Arc<Mutex<Shared>>,
    script: Arc<ProgressScript>,
    generator: Arc<G>,
    step_interval: Duration,
    completion_delay: Duration,
}

impl<G: FrameGenerator> Job<G> {
    async fn run<P, C>(self, request: GenerationRequest, mut on_progress: P, on_complete: C)
    where
        P: FnMut(&ProgressState) + Send + 'static,
        C: FnOnce(Result<SceneBoard>) + Send + 'static,
    {
        let mut ticker = time::interval_at(Instant::now() + self.step_interval, self.step_interval);

        for index in 0..self.script.len() {
            tokio::select! {
                _ = self.token.cancelled() => {
                    debug!("Run {} stopped before step {}", self.run_id, index + 1);
                    return;
                }
                _ = ticker.tick() => {}
            }

            let snapshot = {
                let mut shared = self.shared.lock();
                if self.token.is_cancelled() {
                    return;
                }
                shared.progress = self.script.state_after(index);
                shared.phase = SessionPhase::Generating {
                    stage: shared.progress.stage,
                };
                shared.progress.clone()
            };
            debug!("Run {}: {}% {}", self.run_id, snapshot.percent, snapshot.message);
            on_progress(&snapshot);
        }

        tokio::select! {
            _ = self.token.cancelled() => {
                debug!("Run {} stopped before completion", self.run_id);
                return;
            }
            _ = time::sleep(self.completion_delay) => {}
        }

        let outcome = self.generator.generate(&request);

        {
            let mut shared = self.shared.lock();
            if self.token.is_cancelled() {
                return;
            }
            shared.phase = match &outcome {
                Ok(_) => SessionPhase::Complete,
                Err(e) => SessionPhase::Failed(e.to_string()),
            };
            shared.run = None;
        }

        match &outcome {
            Ok(board) => info!("Run {} complete with {} frames", self.run_id, board.len()),
            Err(e) => warn!("Run {} failed: {}", self.run_id, e),
        }
        on_complete(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockFrameGenerator;
    use crate::config::{ArtStyle, FrameCount};

    fn session(overlap: OverlapPolicy) -> GenerationSession<MockFrameGenerator> {
        let config = EngineConfig {
            overlap,
            ..EngineConfig::default()
        };
        GenerationSession::new(MockFrameGenerator::default(), ProgressScript::default(), &config)
    }

    fn request(text: &str) -> GenerationRequest {
        GenerationRequest::new(text, ArtStyle::Anime, FrameCount::new(4).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_stays_idle() {
        let session = session(OverlapPolicy::Reject);
        let result = session.start(request(" \n "), |_| {}, |_| panic!("must not complete"));
        assert!(matches!(result, Err(StoryboardError::MissingInput)));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.progress(), ProgressState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn start_resets_progress() {
        let session = session(OverlapPolicy::Reject);
        session.start(request("a b"), |_| {}, |_| {}).unwrap();
        let progress = session.progress();
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.stage, 0);
        assert_eq!(progress.message, "Analyzing text content...");
        assert_eq!(session.phase(), SessionPhase::Generating { stage: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_without_job_is_a_no_op() {
        let session = session(OverlapPolicy::Reject);
        assert!(!session.cancel());
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn generate_reports_cancellation() {
        let session = Arc::new(session(OverlapPolicy::Reject));
        let canceller = Arc::clone(&session);
        let result = session
            .generate(request("one two"), move |state| {
                if state.stage == 2 {
                    canceller.cancel();
                }
            })
            .await;
        assert!(matches!(result, Err(StoryboardError::Cancelled)));
        assert_eq!(session.progress().percent, 40);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }
}
