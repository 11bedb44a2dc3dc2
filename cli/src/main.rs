mod cli;
mod error;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use todo_core::{
    resolve_locale, Catalog, Locale, LocaleContext, SyncConfig, SyncError, Todo, TodoApi, TodoForm,
    TodoId, TodoListView, TodoSync, Transport,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::error::{CliError, Result};
use crate::render::TerminalCelebration;

type View<T> = TodoListView<TodoApi<T>>;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let ctx = match resolve_locale(&cli.global.locale) {
        Ok(ctx) => ctx,
        Err(e) => {
            let err = CliError::from(e);
            match Catalog::load(Locale::En) {
                Ok(catalog) => println!("{}", render::not_found(catalog, &cli.global.locale)),
                Err(_) => println!("{err}"),
            }
            return exit(&err);
        }
    };

    tracing::debug!(base_url = %cli.global.base_url, locale = %ctx.locale, "starting");
    let api = TodoApi::connect(&cli.global.base_url);
    let sync = TodoSync::new(
        api,
        SyncConfig {
            stale_policy: cli.global.stale_policy.into(),
        },
    );
    let mut view = TodoListView::new(sync).with_hook(Arc::new(TerminalCelebration::new(&ctx)));

    match run(&mut view, &ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match &err {
                CliError::Sync(SyncError::Validation(v)) => eprintln!("{}", ctx.t(v.message_key())),
                CliError::Batch { .. } => {}
                other => eprintln!("{}", render::api_error(&ctx, other)),
            }
            exit(&err)
        }
    }
}

fn exit(err: &CliError) -> ExitCode {
    tracing::debug!(error = %err, code = err.exit_code(), "exiting with failure");
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}

impl Command {
    /// Commands that act on the cached collection need it fetched first.
    fn reads_list(&self) -> bool {
        matches!(
            self,
            Command::List { .. }
                | Command::Edit { .. }
                | Command::Toggle { .. }
                | Command::Done { .. }
                | Command::Undo { .. }
        )
    }
}

async fn run<T: Transport>(view: &mut View<T>, ctx: &LocaleContext, command: Command) -> Result<()> {
    if command.reads_list() {
        view.activate().await?;
    }

    match command {
        Command::List { tab } => {
            view.set_tab(tab.into());
            let visible = if view.is_loading().await {
                None
            } else {
                Some(view.visible().await)
            };
            print!(
                "{}",
                render::list(ctx, view.tab(), view.counts().await, visible.as_deref())
            );
        }
        Command::Show { id } => {
            let todo = view.sync().store().get_one(id).await?;
            println!("{}", render::detail(ctx, &todo));
        }
        Command::Add { title, description } => {
            *view.new_form_mut() = TodoForm::new(title, description);
            let todo = view.submit_new().await?;
            println!("{}", ctx.t_with("todo.newTodo.created", &[("id", &todo.id.to_string())]));
        }
        Command::Edit { id, title, description } => {
            view.begin_edit(id).await?;
            if let Some(form) = view.edit_form_mut(id) {
                if let Some(title) = title {
                    form.title = title;
                }
                if let Some(description) = description {
                    form.description = description;
                }
            }
            let todo = view.commit_edit(id).await?;
            println!("{}", ctx.t_with("todo.actions.saved", &[("id", &todo.id.to_string())]));
        }
        Command::Toggle { id } => {
            let todo = view.toggle(id).await?;
            print_completion(ctx, &todo);
        }
        Command::Done { id } => set_completed(view, ctx, id, true).await?,
        Command::Undo { id } => set_completed(view, ctx, id, false).await?,
        Command::Rm { id } => {
            view.delete(id).await?;
            println!("{}", ctx.t_with("todo.actions.deleted", &[("id", &id.to_string())]));
        }
        Command::RmMany { ids } => {
            select(view, &ids);
            let report = view.delete_selected().await;
            println!("{}", render::removal(ctx, &report));
            batch_result(report.failed_removals().len(), report.len())?;
        }
        Command::DoneMany { ids } => {
            select(view, &ids);
            let report = view.set_selected_completed(true).await;
            println!("{}", render::batch(ctx, &report));
            batch_result(report.failed().len(), report.len())?;
        }
        Command::UndoMany { ids } => {
            select(view, &ids);
            let report = view.set_selected_completed(false).await;
            println!("{}", render::batch(ctx, &report));
            batch_result(report.failed().len(), report.len())?;
        }
    }
    Ok(())
}

/// Done and undo go through `toggle` when the state actually changes, so the
/// completion hook fires the same way as for an interactive toggle.
async fn set_completed<T: Transport>(
    view: &View<T>,
    ctx: &LocaleContext,
    id: TodoId,
    completed: bool,
) -> Result<()> {
    let current = view.sync().find(id).await.ok_or(SyncError::UnknownTodo(id))?;
    let todo = if current.completed == completed {
        view.sync().set_completed(id, completed).await?
    } else {
        view.toggle(id).await?
    };
    print_completion(ctx, &todo);
    Ok(())
}

fn print_completion(ctx: &LocaleContext, todo: &Todo) {
    let key = if todo.completed {
        "todo.actions.completed"
    } else {
        "todo.actions.uncompleted"
    };
    println!("{}", ctx.t_with(key, &[("id", &todo.id.to_string())]));
}

fn select<T: Transport>(view: &mut View<T>, ids: &[TodoId]) {
    let selection = view.selection_mut();
    selection.clear();
    for id in ids {
        selection.select(*id);
    }
}

fn batch_result(failed: usize, total: usize) -> Result<()> {
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::Batch { failed, total })
    }
}

#[cfg(test)]
mod tests {
    use todo_core::{ApiError, HttpRequest, HttpResponse, TodoClient};

    use super::*;

    async fn start_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(mock_server::run(listener));
        format!("http://{addr}")
    }

    fn view_for<T: Transport>(api: TodoApi<T>) -> View<T> {
        TodoListView::new(TodoSync::new(api, SyncConfig::default()))
    }

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["todo"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    fn en() -> LocaleContext {
        resolve_locale("en").unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn edit_keeps_fields_that_were_not_given() {
        let api = TodoApi::connect(&start_server().await);
        let created = api.create("A", "keep me").await.unwrap();
        let id = created.id.to_string();
        let mut view = view_for(api.clone());

        run(&mut view, &en(), command(&["edit", &id, "--title", "B"])).await.unwrap();
        let edited = api.get_one(created.id).await.unwrap();
        assert_eq!(edited.title, "B");
        assert_eq!(edited.description, "keep me");

        run(&mut view, &en(), command(&["edit", &id, "-d", "new words"])).await.unwrap();
        let edited = api.get_one(created.id).await.unwrap();
        assert_eq!(edited.title, "B");
        assert_eq!(edited.description, "new words");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rm_many_tolerates_already_deleted_member() {
        let api = TodoApi::connect(&start_server().await);
        let a = api.create("a", "").await.unwrap();
        let b = api.create("b", "").await.unwrap();
        api.delete(b.id).await.unwrap();
        let mut view = view_for(api.clone());

        let (a_id, b_id) = (a.id.to_string(), b.id.to_string());
        run(&mut view, &en(), command(&["rm-many", &a_id, &b_id])).await.unwrap();
        assert!(api.list().await.unwrap().is_empty());
        assert!(view.selection().is_empty());

        run(&mut view, &en(), command(&["rm", &b_id])).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn done_and_undo_set_completion() {
        let api = TodoApi::connect(&start_server().await);
        let created = api.create("A", "").await.unwrap();
        let id = created.id.to_string();
        let mut view = view_for(api.clone());

        run(&mut view, &en(), command(&["done", &id])).await.unwrap();
        assert!(api.get_one(created.id).await.unwrap().completed);
        run(&mut view, &en(), command(&["done", &id])).await.unwrap();
        assert!(api.get_one(created.id).await.unwrap().completed);

        run(&mut view, &en(), command(&["undo", &id])).await.unwrap();
        let undone = api.get_one(created.id).await.unwrap();
        assert!(!undone.completed);
        assert_eq!(undone.title, "A");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn done_many_reports_failed_member() {
        let api = TodoApi::connect(&start_server().await);
        let a = api.create("a", "").await.unwrap();
        let mut view = view_for(api.clone());

        let err = run(&mut view, &en(), command(&["done-many", &a.id.to_string(), "999"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Batch { failed: 1, total: 2 }), "{err:?}");
        assert!(api.get_one(a.id).await.unwrap().completed);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_title_exits_with_validation_code() {
        let api = TodoApi::connect(&start_server().await);
        let mut view = view_for(api.clone());

        let err = run(&mut view, &en(), command(&["add", ""])).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(api.list().await.unwrap().is_empty());
    }

    /// Serves single todos but fails every list request.
    struct ListDown;

    impl Transport for ListDown {
        async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, ApiError> {
            let (status, body) = if request.path.ends_with("/api/todos") {
                (500, String::new())
            } else {
                (
                    200,
                    r#"{"id":1,"title":"A","description":"","completed":false,"created_at":"2024-05-01T08:00:00Z","updated_at":"2024-05-01T08:00:00Z"}"#
                        .to_string(),
                )
            };
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body,
            })
        }
    }

    #[tokio::test]
    async fn show_does_not_need_the_list() {
        let api = TodoApi::new(TodoClient::new("http://api.test"), ListDown);
        let mut view = view_for(api);

        run(&mut view, &en(), command(&["show", "1"])).await.unwrap();
        let err = run(&mut view, &en(), command(&["list"])).await.unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
