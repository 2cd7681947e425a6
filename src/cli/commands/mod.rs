mod create_user;
mod init;

pub use create_user::{CreateUserArgs, cmd_create_user};
pub use init::cmd_init;
