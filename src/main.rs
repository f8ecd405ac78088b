use clap::Parser;
use typegen::{
    cli::{AppContext, Cli, Commands},
    error::TypegenError,
    infra::logging,
};

fn main() {
    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        verbose: cli.verbose,
    };
    logging::init(ctx.verbose);

    if let Err(err) = run(cli.command, &ctx) {
        report(err, &ctx);
        std::process::exit(1);
    }
}

fn run(command: Commands, ctx: &AppContext) -> anyhow::Result<()> {
    match command {
        Commands::Generate(args) => typegen::generate_run(args, ctx),
        Commands::Packages(args) => typegen::packages_run(args, ctx),
        Commands::Init(args) => typegen::infra::config::init(args, ctx),
        Commands::Completions(args) => typegen::completion::run(args, ctx),
    }
}

/// Domain errors get a miette report with code and help; the rest plain.
fn report(err: anyhow::Error, ctx: &AppContext) {
    match err.downcast::<TypegenError>() {
        Ok(domain) => {
            let color = !ctx.no_color;
            let _ = miette::set_hook(Box::new(
                move |_: &(dyn miette::Diagnostic + 'static)| -> Box<dyn miette::ReportHandler> {
                    Box::new(miette::MietteHandlerOpts::new().color(color).build())
                },
            ));
            eprintln!("{:?}", miette::Report::new(domain));
        }
        Err(other) => eprintln!("Error: {other:#}"),
    }
}
