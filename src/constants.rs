pub mod session {

    /// Session key holding the authenticated username.
    pub const IDENTITY_KEY: &str = "username";

    /// Session key holding pending flash messages.
    pub const FLASH_KEY: &str = "_flashes";
}

pub mod limits {

    pub const MAX_STRING_LENGTH: usize = 64;

    pub const MIN_PASSWORD_LENGTH: usize = 6;

    pub const MAX_PASSWORD_LENGTH: usize = 20;
}

pub mod labels {

    pub const USERNAME: &str = "username";

    pub const FIRST_NAME: &str = "first_name";

    pub const LAST_NAME: &str = "last_name";

    pub const EMAIL: &str = "email";

    pub const PASSWORD: &str = "password";

    pub const VERIFY: &str = "verify";
}
