// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}
