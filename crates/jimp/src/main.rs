use clap::builder::styling::{AnsiColor, Styles};
use clap::{ColorChoice, CommandFactory, FromArgMatches, Parser};
use std::path::{Path, PathBuf};

use jimp::classpath::{self, ClasspathEntry};
use jimp::project::{self, Project};
use jimp::{cache, config, index, resolve, scan};

#[derive(Parser)]
#[command(name = "jimp")]
#[command(about = "Crude Java import solver")]
#[command(
    after_help = "Prints one `import <fqn>;` line per resolved symbol, sorted.\n\
                  Classpath and cache file come from flags or from a profile."
)]
struct Cli {
    /// Java source file to solve imports for
    target: PathBuf,

    /// Colon-separated classpath: source dirs, jars, or globs; prefix a
    /// component with `!` to remove its matches
    #[arg(short, long, value_name = "SPEC")]
    classpath: Option<String>,

    /// Package index cache file (gzip-compressed JSON)
    #[arg(short = 'f', long, value_name = "PATH")]
    cache_file: Option<String>,

    /// Profile config: <file> or <file>:<name>. The bare form picks the
    /// profile named by `jimp.profile` in the project's properties
    #[arg(short, long, value_name = "FILE[:NAME]")]
    profile: Option<String>,
}

/// Help output styling.
const HELP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().bold())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::Cyan.on_default().bold())
    .placeholder(AnsiColor::Cyan.on_default());

/// Determine color choice for help output. NO_COLOR wins.
fn help_color_choice() -> ColorChoice {
    if std::env::var("NO_COLOR").is_ok() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

/// Reset SIGPIPE to default behavior so piping to `head` etc. doesn't panic.
#[cfg(unix)]
fn reset_sigpipe() {
    // SAFETY: libc::signal is a standard POSIX function. We reset SIGPIPE to
    // default behavior (terminate on broken pipe) instead of Rust's default
    // (ignore, causing write errors). No memory safety concerns - just
    // changes signal disposition.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Pull classpath/cache-file defaults out of the profile config, CLI flags
/// winning. `spec` is `<file>` or `<file>:<name>`; the bare form asks the
/// project for its `jimp.profile` key.
fn apply_profile(
    spec: &str,
    project: Option<&Project>,
    classpath: &mut Option<String>,
    cache_file: &mut Option<String>,
) -> Result<(), String> {
    let (path, name) = match spec.split_once(':') {
        Some((path, name)) => (path, Some(name.to_string())),
        None => (spec, None),
    };
    let name = match name.or_else(|| project.and_then(|p| p.profile_name())) {
        Some(n) => n,
        None => return Err("you need to explicitly set a profile (use <file>:<name>)".into()),
    };

    let profile = config::load_profile(&expand_home(path), &name)?;
    if classpath.is_none() {
        *classpath = profile.classpath;
    }
    if cache_file.is_none() {
        *cache_file = profile.cache_file;
    }
    Ok(())
}

fn run(cli: Cli) -> i32 {
    let text = match std::fs::read_to_string(&cli.target) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", cli.target.display(), e);
            return 1;
        }
    };
    let symbols = scan::scan(&text);
    let project = Project::locate(symbols.namespace.as_deref(), &cli.target);

    let mut classpath_spec = cli.classpath;
    let mut cache_file = cli.cache_file;
    if let Some(spec) = &cli.profile {
        if let Err(e) = apply_profile(
            spec,
            project.as_ref(),
            &mut classpath_spec,
            &mut cache_file,
        ) {
            eprintln!("error: {}", e);
            eprintln!("specify --classpath and --cache-file explicitly, or fix the profile");
            return 2;
        }
    }
    let (Some(classpath_spec), Some(cache_file)) = (classpath_spec, cache_file) else {
        eprintln!("error: you need to set a profile or --classpath/--cache-file");
        eprintln!("usage: jimp [--profile <file>[:<name>]] [--classpath <spec>] [--cache-file <path>] <target.java>");
        return 2;
    };
    let cache_file = expand_home(&cache_file);

    let entries: Vec<ClasspathEntry> =
        classpath::expand(&classpath_spec, project.as_ref().map(|p| p.root()))
            .into_iter()
            .map(ClasspathEntry::from_path)
            .collect();

    let mut packages = if cache::needs_rebuild(&cache_file, &entries) {
        let built = index::build(&entries);
        if let Err(e) = cache::save(&cache_file, &classpath::as_strings(&entries), &built) {
            eprintln!("warning: {}", e);
        }
        built
    } else {
        match cache::load(&cache_file) {
            Ok((_, loaded)) => loaded,
            Err(e) => {
                eprintln!("warning: {}", e);
                index::build(&entries)
            }
        }
    };

    // The target's own project tree is always fresher than the cache: re-scan
    // it on top of the loaded index and stash the project's declared package
    // for resource-class substitution.
    if let Some(own_root) = project::source_root(symbols.namespace.as_deref(), &cli.target) {
        let target_dir = cli
            .target
            .canonicalize()
            .unwrap_or_else(|_| cli.target.clone())
            .parent()
            .map(Path::to_path_buf);
        index::add_source_tree(&mut packages, &own_root, target_dir.as_deref());
    }
    if let Some(project) = &project {
        if let Some(package) = project.package_name() {
            packages.set_own_package(&package);
        }
    }

    for import in resolve::solve(&symbols, &packages) {
        println!("import {};", import);
    }
    0
}

fn main() {
    reset_sigpipe();

    let matches = Cli::command()
        .styles(HELP_STYLES)
        .color(help_color_choice())
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).expect("clap mismatch");

    std::process::exit(run(cli));
}
