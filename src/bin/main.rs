// png2bmp entry point
//
// usage: png2bmp [-b RRGGBB] <in.png> <out.bmp>
// exit: 0 ok, 1 usage or input, 2 output, 3 BMP too wide, 4 PNG decode error

use std::process::ExitCode;

use png2bmp::cli;
use png2bmp::logger;

fn main() -> ExitCode {
    logger::init_logger_from_env();

    let result = cli::parse_args(std::env::args().skip(1)).and_then(|args| cli::run(&args));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(cli::Failure::Help(text)) => {
            print!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
