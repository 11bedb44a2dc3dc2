use clap::{Args, Parser, Subcommand, ValueEnum};
use todo_core::{StalePolicy, Tab, TodoId, DEFAULT_BASE_URL};

#[derive(Parser, Debug, Clone)]
#[command(name = "todo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Base URL of the todo service
    #[arg(long, global = true, env = "TODO_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Locale segment (en or zh)
    #[arg(long, global = true, env = "TODO_LOCALE", default_value = "en")]
    pub locale: String,

    /// How to treat list responses that arrive out of order
    #[arg(long, global = true, env = "TODO_STALE_POLICY", value_enum, default_value_t = StaleArg::Fenced)]
    pub stale_policy: StaleArg,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the todos of one tab with both count badges
    List {
        #[arg(long, value_enum, default_value_t = TabArg::Uncompleted)]
        tab: TabArg,
    },
    /// Show a single todo
    Show { id: TodoId },
    /// Create a todo
    Add {
        title: String,
        #[arg(long, short, default_value = "")]
        description: String,
    },
    /// Change title and/or description of a todo; omitted fields keep their value
    Edit {
        id: TodoId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Flip completion of a todo
    Toggle { id: TodoId },
    /// Mark a todo completed
    Done { id: TodoId },
    /// Mark a todo not completed
    Undo { id: TodoId },
    /// Delete a todo
    Rm { id: TodoId },
    /// Delete several todos at once
    RmMany {
        #[arg(required = true)]
        ids: Vec<TodoId>,
    },
    /// Mark several todos completed
    DoneMany {
        #[arg(required = true)]
        ids: Vec<TodoId>,
    },
    /// Mark several todos not completed
    UndoMany {
        #[arg(required = true)]
        ids: Vec<TodoId>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabArg {
    Uncompleted,
    Completed,
}

impl From<TabArg> for Tab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Uncompleted => Tab::Uncompleted,
            TabArg::Completed => Tab::Completed,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleArg {
    Fenced,
    LastArrival,
}

impl From<StaleArg> for StalePolicy {
    fn from(policy: StaleArg) -> Self {
        match policy {
            StaleArg::Fenced => StalePolicy::Fenced,
            StaleArg::LastArrival => StalePolicy::LastArrivalWins,
        }
    }
}
