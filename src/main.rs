use std::process::ExitCode;
use taprun::cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Match the output language to the system locale before anything prints.
    // 在任何输出之前，使输出语言匹配系统区域设置。
    taprun::init();

    match cli::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
