use std::process::Command;

fn main() {
    emit_git_commit();
}

fn emit_git_commit() {
    let output = Command::new("git").args(["rev-parse", "HEAD"]).output();

    let commit = match output {
        Ok(out) if out.status.success() => {
            let raw = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if raw.is_empty() {
                "unknown".to_string()
            } else {
                raw
            }
        }
        _ => "unknown".to_string(),
    };

    println!("cargo:rustc-env=KOIDUMP_GIT_HASH={commit}");
}
