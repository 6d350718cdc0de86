use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use landing::build::{build_site, BuildOptions};
use landing::config::Config;
use landing::publish::clean;
use landing::prompt::Prompter;
use landing::qr;
use landing::vcard::{Contact, LineEnding};
use log::info;
use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  caused by: {}", err);
            source = err.source();
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let project = Arg::with_name("project")
        .short("p")
        .long("project")
        .takes_value(true)
        .value_name("DIR")
        .help("The project directory (or a subdirectory of it) holding site.yaml");
    let output = Arg::with_name("output")
        .short("o")
        .long("output")
        .takes_value(true)
        .value_name("DIR")
        .help("Overrides the output directory from site.yaml");

    let matches = App::new("landing")
        .version(crate_version!())
        .about("Builds a single-page static site")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Renders the site and publishes it to the output directory")
                .arg(project.clone())
                .arg(output.clone())
                .arg(
                    Arg::with_name("minify")
                        .long("minify")
                        .help("Minifies the rendered HTML"),
                ),
        )
        .subcommand(
            SubCommand::with_name("clean")
                .about("Removes the output directory")
                .arg(project)
                .arg(output),
        )
        .subcommand(vcard_command())
        .get_matches();

    match matches.subcommand() {
        ("build", Some(m)) => {
            let config = load_config(m)?;
            build_site(
                &config,
                BuildOptions {
                    minify: m.is_present("minify"),
                },
            )?;
            Ok(())
        }
        ("clean", Some(m)) => {
            let config = load_config(m)?;
            clean(&config.output_directory)?;
            info!("removed '{}'", config.output_directory.display());
            Ok(())
        }
        ("vcard", Some(m)) => write_vcard(m),
        _ => Ok(()), // SubcommandRequiredElseHelp
    }
}

fn load_config(m: &ArgMatches) -> Result<Config> {
    let project = Path::new(m.value_of("project").unwrap_or("."));
    let mut config = Config::from_directory(project)?;
    if let Some(output) = m.value_of("output") {
        config.output_directory = PathBuf::from(output);
    }
    Ok(config)
}

// (name, short flag, help) for each free-text vCard field.
const VCARD_FIELDS: [(&str, Option<&str>, &str); 13] = [
    ("name", Some("n"), "Full formatted name; optional if --given or --surname is set"),
    ("given", Some("f"), "Given name / first name"),
    ("surname", Some("s"), "Surname / family name"),
    ("preferred-name", None, "Preferred name; populates NICKNAME and X-PREFERRED-NAME"),
    ("email", Some("e"), "Email address (visible in the process list; omit it to be asked without echo)"),
    ("phone", Some("p"), "Phone number (visible in the process list; omit it to be asked without echo)"),
    ("github", Some("g"), "GitHub username or full profile URL"),
    ("city", Some("c"), "City / locality"),
    ("country", None, "Country"),
    ("note", None, "Note, e.g. 'Open for hire'; asked without echo when omitted"),
    ("avatar", Some("a"), "Avatar image http(s) URL; inline images aren't supported"),
    ("pgp-key-uri", None, "PGP public key http(s) URL"),
    ("pgp-fingerprint", None, "PGP fingerprint: 8, 16, or 40 hex characters"),
];

fn vcard_command<'a, 'b>() -> App<'a, 'b> {
    let mut command = SubCommand::with_name("vcard")
        .about("Writes a vCard contact and a QR code SVG of it, asking for missing fields")
        .arg(
            Arg::with_name("out-svg")
                .long("out-svg")
                .takes_value(true)
                .value_name("PATH")
                .default_value("vcf_qr.svg")
                .help("Output SVG file for the QR code"),
        )
        .arg(
            Arg::with_name("vcf")
                .short("v")
                .long("vcf")
                .takes_value(true)
                .value_name("PATH")
                .help("Also writes the .vcf file"),
        )
        .arg(
            Arg::with_name("line-ending")
                .long("line-ending")
                .takes_value(true)
                .possible_values(&["crlf", "lf"])
                .default_value("crlf")
                .help("Line ending in the vCard"),
        )
        .arg(
            Arg::with_name("no-prompt")
                .long("no-prompt")
                .help("Doesn't ask for missing fields on stdin"),
        );
    for &(name, short, help) in VCARD_FIELDS.iter() {
        let mut arg = Arg::with_name(name)
            .long(name)
            .takes_value(true)
            .help(help);
        if let Some(short) = short {
            arg = arg.short(short);
        }
        command = command.arg(arg);
    }
    command
}

fn write_vcard(m: &ArgMatches) -> Result<()> {
    let field = |name: &str| m.value_of(name).unwrap_or_default().to_owned();
    let mut contact = Contact {
        name: field("name"),
        given: field("given"),
        surname: field("surname"),
        preferred_name: field("preferred-name"),
        email: field("email"),
        phone: field("phone"),
        github: field("github"),
        city: field("city"),
        country: field("country"),
        note: field("note"),
        avatar: field("avatar"),
        pgp_key_uri: field("pgp-key-uri"),
        pgp_fingerprint: field("pgp-fingerprint"),
        line_ending: m
            .value_of("line-ending")
            .unwrap_or("crlf")
            .parse::<LineEnding>()?,
    };

    if !m.is_present("no-prompt") {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        if interactive {
            prompter = prompter.hide_sensitive();
        }
        prompter.fill_missing(&mut contact)?;
    }

    let vcard = contact.to_vcard()?;
    let svg = qr::to_svg(&vcard).map_err(|e| format!("Encoding QR code: {}", e))?;

    let out_svg = m.value_of("out-svg").unwrap_or("vcf_qr.svg");
    std::fs::write(out_svg, svg).map_err(|e| format!("Writing '{}': {}", out_svg, e))?;
    info!("saved QR SVG to '{}'", out_svg);

    if let Some(vcf) = m.value_of("vcf") {
        std::fs::write(vcf, &vcard).map_err(|e| format!("Writing '{}': {}", vcf, e))?;
        info!("saved vCard to '{}'", vcf);
    }
    Ok(())
}
