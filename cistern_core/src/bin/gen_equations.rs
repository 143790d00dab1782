//! Keep `EQUATIONS.md` in sync with the equation registry.
//!
//! ```bash
//! cargo run --bin gen-equations            # rewrite if out of date
//! cargo run --bin gen-equations -- --check # exit 1 if out of date (CI)
//! ```
//!
//! The file lives at `cistern_core/src/equations/EQUATIONS.md`, resolved
//! from the crate directory so the binary works from any working directory.

use std::path::Path;
use std::process;

use cistern_core::equations::{sync_equations_markdown, MarkdownSync};

fn main() {
    let check_only = std::env::args().skip(1).any(|arg| arg == "--check");
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/equations/EQUATIONS.md");

    match sync_equations_markdown(&path, check_only) {
        Ok(MarkdownSync::Current) => println!("{} is up to date", path.display()),
        Ok(MarkdownSync::Written) => println!("Updated {}", path.display()),
        Ok(MarkdownSync::Stale) => {
            eprintln!("{} is out of date; run `cargo run --bin gen-equations`", path.display());
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error [{}]: {}", e.error_code(), e);
            process::exit(1);
        }
    }
}
