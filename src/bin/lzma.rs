use clap::{arg,crate_version,Command};
use lzcraft::archiver::{Archiver,Backend};

const RCH: &str = "unreachable was reached";

fn main() -> Result<(),Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env().init();

    let long_help =
"Examples:
---------
Create:   `lzma create -o my_archive.lzma file1.txt file2.txt`
Extract:  `lzma extract my_archive.lzma -d out_dir`
List:     `lzma list my_archive.lzma`
Add:      `lzma add my_archive.lzma file3.txt`";

    let mut main_cmd = Command::new("lzma")
        .about("Archive files with a range-coded LZMA backend")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("create")
        .arg(arg!(-o --output <ARCHIVE> "archive path").required(true))
        .arg(arg!(-l --level <LEVEL> "compression level (0..9, advisory)").required(false))
        .arg(arg!(<FILES> ... "input files").required(true))
        .about("create a new archive"));
    main_cmd = main_cmd.subcommand(Command::new("extract")
        .arg(arg!(<ARCHIVE> "archive path").required(true))
        .arg(arg!(-d --directory <DIR> "output directory").required(false))
        .about("extract an archive"));
    main_cmd = main_cmd.subcommand(Command::new("list")
        .arg(arg!(<ARCHIVE> "archive path").required(true))
        .about("list an archive's contents"));
    main_cmd = main_cmd.subcommand(Command::new("add")
        .arg(arg!(<ARCHIVE> "archive path").required(true))
        .arg(arg!(<FILES> ... "input files").required(true))
        .about("append files to an existing archive"));

    let matches = main_cmd.get_matches();
    let archiver = Archiver::new(Backend::Lzma);

    let result = if let Some(cmd) = matches.subcommand_matches("create") {
        let output = cmd.get_one::<String>("output").expect(RCH);
        let files: Vec<&String> = cmd.get_many::<String>("FILES").expect(RCH).collect();
        if let Some(level) = cmd.get_one::<String>("level") {
            match level.parse::<u8>() {
                Ok(n) if n <= 9 => log::debug!("level {} requested; the bespoke coder has no tunable levels",n),
                _ => return Err(format!("invalid --level {:?}: expected an integer 0..9",level).into()),
            }
        }
        archiver.create(&files,std::path::Path::new(output)).map(|_| ())
    } else if let Some(cmd) = matches.subcommand_matches("extract") {
        let archive = cmd.get_one::<String>("ARCHIVE").expect(RCH);
        let dir = cmd.get_one::<String>("directory").map(String::as_str).unwrap_or(".");
        archiver.extract(std::path::Path::new(archive),std::path::Path::new(dir)).map(|_| ())
    } else if let Some(cmd) = matches.subcommand_matches("list") {
        let archive = cmd.get_one::<String>("ARCHIVE").expect(RCH);
        archiver.list(std::path::Path::new(archive)).map(|_| ())
    } else if let Some(cmd) = matches.subcommand_matches("add") {
        let archive = cmd.get_one::<String>("ARCHIVE").expect(RCH);
        let files: Vec<&String> = cmd.get_many::<String>("FILES").expect(RCH).collect();
        archiver.add(std::path::Path::new(archive),&files).map(|_| ())
    } else {
        eprintln!("no subcommand given; see --help");
        std::process::exit(1);
    };

    if let Err(err) = &result {
        log::error!("{}",err);
    }
    result.map_err(|e| e.into())
}
