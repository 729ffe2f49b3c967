use std::env;
use std::path::PathBuf;

fn main() {
    // libcurl must be available as a system library. Most distros ship it
    // (libcurl4 / curl-devel); CURL_INSTALL_DIR can point at a custom build
    // (e.g. a libcurl compiled with --with-openssl and AWS_SIGV4 support).
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    if let Ok(dir) = env::var("CURL_INSTALL_DIR") {
        let install_dir = PathBuf::from(&dir);
        let lib_dir = ["lib", "lib64"]
            .iter()
            .map(|d| install_dir.join(d))
            .find(|d| d.exists())
            .unwrap_or_else(|| {
                panic!(
                    "CURL_INSTALL_DIR={} set but no lib/ or lib64/ directory found there.",
                    install_dir.display()
                )
            });
        println!("cargo:rustc-link-search=native={}", lib_dir.display());
    } else {
        // Fall back to pkg-config style well-known locations; if libcurl is
        // installed via the system package manager the linker already knows
        // where to find it and no extra search path is needed.
        for candidate in ["/usr/lib", "/usr/lib64", "/usr/local/lib", "/opt/homebrew/lib"] {
            let path = PathBuf::from(candidate);
            if path.join("libcurl.so").exists()
                || path.join("libcurl.dylib").exists()
                || path.join("libcurl.a").exists()
            {
                println!("cargo:rustc-link-search=native={}", candidate);
                break;
            }
        }
    }

    println!("cargo:rustc-link-lib=dylib=curl");

    match target_os.as_str() {
        "macos" => {
            println!("cargo:rustc-link-lib=framework=CoreFoundation");
            println!("cargo:rustc-link-lib=framework=Security");
        }
        "linux" => {
            println!("cargo:rustc-link-lib=dylib=pthread");
            println!("cargo:rustc-link-lib=dylib=dl");
        }
        _ => {}
    }

    println!("cargo:rerun-if-env-changed=CURL_INSTALL_DIR");
}
