// Resolution-only placeholder for the real `gsmtc` crate, which is not
// available in the build registry. See Cargo.toml in this directory.
// Deliberately empty: compiling against this on Windows fails loudly
// instead of silently substituting fake behavior.
compile_error!(
    "This is a resolution-only gsmtc stub; use the real crates.io gsmtc for Windows builds"
);
