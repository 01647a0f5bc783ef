/// Build-time override through `BARKSY_VERSION`, otherwise the crate version.
pub const VERSION: &str = match option_env!("BARKSY_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
