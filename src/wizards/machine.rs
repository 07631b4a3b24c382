//! Table driven wizard engine.
//!
//! A [`Flow`] declares its steps once, in order, each with an activation
//! predicate over the collected parameters. Forward moves and `go_back` are
//! both derived from that table, so a flow never tracks its own position.

use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::bot::handlers::menu::Menu;
use crate::components::Reply;
use crate::constants::GO_BACK;
use crate::errors::{BotError, Result};
use crate::services::Services;

/// What the user sent to the active step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Callback(&'a str),
    Text(&'a str),
}

/// One row of a flow's step table.
pub struct StepDecl<S, P> {
    pub step: S,
    pub when: fn(&P) -> bool,
}

pub fn always<P>(_: &P) -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance<S> {
    /// Next active step in table order.
    Next,
    Goto(S),
    /// Previous active step, exactly like pressing Go Back.
    Back,
    /// Render the current step again.
    Redraw,
    /// Stay put without rendering.
    Hold,
    /// Exit and show the parent menu.
    Leave,
    /// Exit, the replies already close the conversation.
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<S> {
    pub advance: Advance<S>,
    pub replies: Vec<Reply>,
}

impl<S> Outcome<S> {
    fn with(advance: Advance<S>) -> Self {
        Self { advance, replies: Vec::new() }
    }

    pub fn next() -> Self {
        Self::with(Advance::Next)
    }

    pub fn goto(step: S) -> Self {
        Self::with(Advance::Goto(step))
    }

    pub fn back() -> Self {
        Self::with(Advance::Back)
    }

    pub fn redraw() -> Self {
        Self::with(Advance::Redraw)
    }

    pub fn hold() -> Self {
        Self::with(Advance::Hold)
    }

    pub fn leave() -> Self {
        Self::with(Advance::Leave)
    }

    pub fn done() -> Self {
        Self::with(Advance::Done)
    }

    /// Stay on the step and answer with a popup.
    pub fn toast(text: impl Into<String>) -> Self {
        Self::hold().reply(Reply::toast(text))
    }

    pub fn reply(mut self, reply: Reply) -> Self {
        self.replies.push(reply);
        self
    }

    pub fn replies(mut self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.replies.extend(replies);
        self
    }
}

/// Per-update context handed to every step.
#[derive(Clone)]
pub struct StepContext {
    pub services: Arc<Services>,
    pub user_id: String,
    pub step_timeout: Duration,
}

impl StepContext {
    pub fn new(services: Arc<Services>, user_id: impl Into<String>, step_timeout: Duration) -> Self {
        Self {
            services,
            user_id: user_id.into(),
            step_timeout,
        }
    }
}

#[async_trait]
pub trait Flow: Send + Sync {
    type Step: Copy + Eq + Debug + Send + Sync;
    type Params: Default + Debug + Clone + Send + Sync;

    fn name(&self) -> &'static str;

    fn steps(&self) -> &[StepDecl<Self::Step, Self::Params>];

    /// Menu shown when the flow is left.
    fn parent(&self) -> Menu;

    /// Forget whatever `step` collected.
    fn clear(&self, step: Self::Step, params: &mut Self::Params);

    async fn render(
        &self,
        step: Self::Step,
        params: &mut Self::Params,
        ctx: &StepContext,
    ) -> Result<Vec<Reply>>;

    async fn handle(
        &self,
        step: Self::Step,
        input: Input<'_>,
        params: &mut Self::Params,
        ctx: &StepContext,
    ) -> Result<Outcome<Self::Step>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardState<S, P> {
    pub cursor: S,
    pub params: P,
}

/// Result of feeding a wizard: its next state (if it is still running),
/// what to send and which menu to show after leaving.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress<T> {
    pub state: Option<T>,
    pub replies: Vec<Reply>,
    pub exit_to: Option<Menu>,
}

impl<T> Progress<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Progress<U> {
        Progress {
            state: self.state.map(f),
            replies: self.replies,
            exit_to: self.exit_to,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_none()
    }
}

pub fn first_step<F: Flow>(flow: &F, params: &F::Params) -> Option<F::Step> {
    flow.steps().iter().find(|d| (d.when)(params)).map(|d| d.step)
}

fn position<F: Flow>(flow: &F, step: F::Step) -> Option<usize> {
    flow.steps().iter().position(|d| d.step == step)
}

pub fn next_step<F: Flow>(flow: &F, current: F::Step, params: &F::Params) -> Option<F::Step> {
    let index = position(flow, current)?;
    flow.steps()[index + 1..]
        .iter()
        .find(|d| (d.when)(params))
        .map(|d| d.step)
}

/// Previous active step, `None` on the first one.
pub fn back_target<F: Flow>(flow: &F, current: F::Step, params: &F::Params) -> Option<F::Step> {
    let index = position(flow, current)?;
    flow.steps()[..index]
        .iter()
        .rev()
        .find(|d| (d.when)(params))
        .map(|d| d.step)
}

async fn bounded<T>(ctx: &StepContext, name: &str, future: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(ctx.step_timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(BotError::ServiceUnavailable(format!(
            "step of {} exceeded {:?}",
            name, ctx.step_timeout
        ))),
    }
}

type Running<F> = WizardState<<F as Flow>::Step, <F as Flow>::Params>;

fn fail<F: Flow>(flow: &F, err: BotError, mut replies: Vec<Reply>) -> Progress<Running<F>> {
    error!("Wizard {} failed: {}", flow.name(), err);
    replies.push(Reply::notice(err.user_message()));
    Progress {
        state: None,
        replies,
        exit_to: Some(flow.parent()),
    }
}

fn leave<F: Flow>(flow: &F, replies: Vec<Reply>) -> Progress<Running<F>> {
    info!("Leaving wizard {}", flow.name());
    Progress {
        state: None,
        replies,
        exit_to: Some(flow.parent()),
    }
}

async fn show<F: Flow>(
    flow: &F,
    mut state: Running<F>,
    mut replies: Vec<Reply>,
    ctx: &StepContext,
) -> Progress<Running<F>> {
    debug!("Wizard {} rendering {:?}", flow.name(), state.cursor);
    match bounded(ctx, flow.name(), flow.render(state.cursor, &mut state.params, ctx)).await {
        Ok(rendered) => {
            replies.extend(rendered);
            Progress {
                state: Some(state),
                replies,
                exit_to: None,
            }
        }
        Err(e) => fail(flow, e, replies),
    }
}

/// Start a flow on its first active step.
pub async fn enter<F: Flow>(flow: &F, params: F::Params, ctx: &StepContext) -> Progress<Running<F>> {
    info!("User {} entered wizard {}", ctx.user_id, flow.name());
    match first_step(flow, &params) {
        Some(cursor) => show(flow, WizardState { cursor, params }, Vec::new(), ctx).await,
        None => leave(flow, Vec::new()),
    }
}

/// Feed one input to a running flow.
pub async fn dispatch<F: Flow>(
    flow: &F,
    mut state: Running<F>,
    input: Input<'_>,
    ctx: &StepContext,
) -> Progress<Running<F>> {
    if input == Input::Callback(GO_BACK) {
        return go_back(flow, state, ctx).await;
    }

    let handled = bounded(
        ctx,
        flow.name(),
        flow.handle(state.cursor, input, &mut state.params, ctx),
    )
    .await;

    let outcome = match handled {
        Ok(outcome) => outcome,
        Err(e) => return fail(flow, e, Vec::new()),
    };

    let replies = outcome.replies;
    match outcome.advance {
        Advance::Next => match next_step(flow, state.cursor, &state.params) {
            Some(step) => {
                state.cursor = step;
                show(flow, state, replies, ctx).await
            }
            None => leave(flow, replies),
        },
        Advance::Goto(step) => {
            state.cursor = step;
            show(flow, state, replies, ctx).await
        }
        Advance::Back => {
            let mut progress = go_back(flow, state, ctx).await;
            progress.replies.splice(0..0, replies);
            progress
        }
        Advance::Redraw => show(flow, state, replies, ctx).await,
        Advance::Hold => Progress {
            state: Some(state),
            replies,
            exit_to: None,
        },
        Advance::Leave => leave(flow, replies),
        Advance::Done => {
            info!("Wizard {} finished", flow.name());
            Progress {
                state: None,
                replies,
                exit_to: None,
            }
        }
    }
}

/// Return to the previous active step with both steps' inputs cleared.
pub async fn go_back<F: Flow>(flow: &F, mut state: Running<F>, ctx: &StepContext) -> Progress<Running<F>> {
    match back_target(flow, state.cursor, &state.params) {
        Some(target) => {
            debug!("Wizard {} going back {:?} -> {:?}", flow.name(), state.cursor, target);
            flow.clear(state.cursor, &mut state.params);
            flow.clear(target, &mut state.params);
            state.cursor = target;
            show(flow, state, Vec::new(), ctx).await
        }
        None => leave(flow, Vec::new()),
    }
}
