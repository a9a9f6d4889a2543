use std::io;

use office_to_pdf::action::cli::process_args;

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match process_args(args)? {
        Some(run) => {
            log::info!("程式執行完成，成功 {} 個，失敗 {} 個", run.succeeded, run.failed);
        }
        None => log::info!("程式執行完成"),
    }
    Ok(())
}
