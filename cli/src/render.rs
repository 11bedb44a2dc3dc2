//! Plain-text rendering of the list view for a terminal.

use std::fmt::Write as _;
use std::io::Write as _;

use todo_core::{
    ApiError, BatchReport, Catalog, CompletionHook, LocaleContext, Tab, TabCounts, Todo, TodoId,
};

/// Tab header with both count badges; the active tab is bracketed.
pub fn tabs(ctx: &LocaleContext, active: Tab, counts: TabCounts) -> String {
    [(Tab::Uncompleted, counts.uncompleted), (Tab::Completed, counts.completed)]
        .into_iter()
        .map(|(tab, n)| {
            let label = format!("{} ({n})", ctx.t(tab.label_key()));
            if tab == active {
                format!("[{label}]")
            } else {
                format!(" {label} ")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn todo(ctx: &LocaleContext, todo: &Todo) -> String {
    let mark = if todo.completed { "[x]" } else { "[ ]" };
    let created = ctx.format_datetime(&todo.created_at);
    let mut out = format!("{mark} #{} {}", todo.id, todo.title);
    if !todo.description.is_empty() {
        let _ = write!(out, "\n      {}", todo.description);
    }
    let _ = write!(
        out,
        "\n      {}",
        ctx.t_with("todo.metadata.createdAt", &[("datetime", &created)])
    );
    out
}

/// Full detail of one todo, including the last update time.
pub fn detail(ctx: &LocaleContext, item: &Todo) -> String {
    let updated = ctx.format_datetime(&item.updated_at);
    format!(
        "{}\n      {}",
        todo(ctx, item),
        ctx.t_with("todo.metadata.updatedAt", &[("datetime", &updated)])
    )
}

/// `visible` is `None` while the first fetch has not landed.
pub fn list(ctx: &LocaleContext, active: Tab, counts: TabCounts, visible: Option<&[Todo]>) -> String {
    let mut out = format!("{}\n{}\n", ctx.t("todo.title"), tabs(ctx, active, counts));
    let Some(visible) = visible else {
        let _ = write!(out, "\n  {}\n", ctx.t("todo.loading"));
        return out;
    };
    if visible.is_empty() {
        let prefix = active.empty_key();
        let _ = write!(
            out,
            "\n  {}\n  {}\n",
            ctx.t_with(&format!("{prefix}.title"), &[]),
            ctx.t_with(&format!("{prefix}.description"), &[])
        );
        return out;
    }
    for item in visible {
        let _ = write!(out, "\n{}\n", todo(ctx, item));
    }
    out
}

/// Page shown for an unknown locale segment.
pub fn not_found(catalog: &Catalog, segment: &str) -> String {
    format!(
        "{}\n{}",
        catalog.t("notFound.title"),
        catalog.t_with("notFound.description", &[("segment", segment)])
    )
}

pub fn api_error(ctx: &LocaleContext, err: &dyn std::fmt::Display) -> String {
    ctx.t_with("todo.error", &[("error", &err.to_string())])
}

/// Summary line plus one line per failed member.
pub fn batch<T>(ctx: &LocaleContext, report: &BatchReport<T>) -> String {
    summary(ctx, report.succeeded().len(), &report.failed())
}

/// Like `batch`, but ids that were already gone count as removed.
pub fn removal(ctx: &LocaleContext, report: &BatchReport<()>) -> String {
    summary(ctx, report.removed().len(), &report.failed_removals())
}

fn summary(ctx: &LocaleContext, succeeded: usize, failed: &[(TodoId, &ApiError)]) -> String {
    let mut out = ctx.t_with(
        "todo.batch.summary",
        &[
            ("succeeded", &succeeded.to_string()),
            ("failed", &failed.len().to_string()),
        ],
    );
    for (id, err) in failed {
        let _ = write!(
            out,
            "\n  {}",
            ctx.t_with(
                "todo.batch.failedItem",
                &[("id", &id.to_string()), ("error", &err.to_string())]
            )
        );
    }
    out
}

/// Rings the terminal bell with a short message whenever a todo is completed.
pub struct TerminalCelebration {
    message: String,
}

impl TerminalCelebration {
    pub fn new(ctx: &LocaleContext) -> Self {
        Self {
            message: ctx.t("todo.celebrate").to_string(),
        }
    }
}

impl CompletionHook for TerminalCelebration {
    fn on_completed(&self, todo: &Todo) {
        tracing::debug!(id = todo.id, "celebrating completion");
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "\x07{}", self.message);
    }
}
