mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_commands, handle_dispatch, handle_export, handle_import, handle_list, handle_search,
    handle_shell,
};
