pub mod fill;
pub mod generate;
pub mod init;
pub mod prompt;
pub mod status;
pub mod util;

pub use fill::*;
pub use generate::*;
pub use init::*;
pub use prompt::*;
pub use status::*;
pub use util::*;
