use clap::{crate_version, Command};

fn main() {
    env_logger::init();

    Command::new("gzrs")
        .about("streaming gzip/DEFLATE encoder: reads stdin, writes a gzip stream to stdout")
        .version(crate_version!())
        .get_matches();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    if let Err(e) = gzrs::gzip::compress_to_writer(stdin.lock(), stdout.lock()) {
        eprintln!("gzrs: {}", e);
        std::process::exit(1);
    }
}
