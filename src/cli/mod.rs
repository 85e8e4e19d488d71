mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    build_service, handle_add, handle_cleanup, handle_complete, handle_delete, handle_export,
    handle_import, handle_info, handle_list, handle_migrate_dir, handle_migrate_images,
    handle_update,
};
