//! Host-side helper: `cargo run` builds the wasm bundle into `static/pkg`
//! and serves `static/` locally so the petal canvas can be checked in a
//! real browser.

use std::env;
use std::process::{self, Command};

fn main() {
    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());

    // 1. Compile the wasm module and its JS glue into static/pkg
    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args([
            "build",
            "--release",
            "--target",
            "web",
            "--out-dir",
            "static/pkg",
        ])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack finished with errors.");
            process::exit(1);
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH (https://rustwasm.github.io/wasm-pack/). Serving whatever is in static/pkg.");
        }
    }

    // 2. Serve static/ until interrupted
    println!("Serving static/ at http://127.0.0.1:{port} …");
    match Command::new("python3")
        .args(["-m", "http.server", &port, "--directory", "static"])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(st) => eprintln!("http server exited with {st}"),
        Err(err) => {
            eprintln!("failed to start http server: {err}");
            process::exit(1);
        }
    }
}
