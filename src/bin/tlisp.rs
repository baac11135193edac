use tlisp::{cmdline, Session};

fn main() {
    pretty_env_logger::init();
    let mut session = Session::new();
    let args = std::env::args().collect();
    if let Err(e) = cmdline::launch(args, &mut session) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
