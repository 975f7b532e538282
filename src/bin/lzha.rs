use clap::{arg,crate_version,Command};
use lzcraft::archiver::{Archiver,Backend};

const RCH: &str = "unreachable was reached";

fn main() -> Result<(),Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env().init();

    let long_help =
"Examples:
---------
Create:   `lzha create -o my_archive.lzha file1.txt file2.txt`
Extract:  `lzha extract my_archive.lzha -d out_dir`
List:     `lzha list my_archive.lzha`
Add:      `lzha add my_archive.lzha file3.txt`";

    let mut main_cmd = Command::new("lzha")
        .about("Archive files with LZ77 + Huffman compression")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("create")
        .arg(arg!(-o --output <ARCHIVE> "archive path").required(true))
        .arg(arg!(--"no-huffman" "skip the Huffman entropy stage").required(false))
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

    let result = if let Some(cmd) = matches.subcommand_matches("create") {
        let output = cmd.get_one::<String>("output").expect(RCH);
        let files: Vec<&String> = cmd.get_many::<String>("FILES").expect(RCH).collect();
        let mut archiver = Archiver::new(Backend::Lz77Huffman);
        if cmd.get_flag("no-huffman") {
            archiver = archiver.without_huffman();
        }
        archiver.create(&files,std::path::Path::new(output)).map(|_| ())
    } else if let Some(cmd) = matches.subcommand_matches("extract") {
        let archive = cmd.get_one::<String>("ARCHIVE").expect(RCH);
        let dir = cmd.get_one::<String>("directory").map(String::as_str).unwrap_or(".");
        Archiver::new(Backend::Lz77Huffman)
            .extract(std::path::Path::new(archive),std::path::Path::new(dir)).map(|_| ())
    } else if let Some(cmd) = matches.subcommand_matches("list") {
        let archive = cmd.get_one::<String>("ARCHIVE").expect(RCH);
        Archiver::new(Backend::Lz77Huffman).list(std::path::Path::new(archive)).map(|_| ())
    } else if let Some(cmd) = matches.subcommand_matches("add") {
        let archive = cmd.get_one::<String>("ARCHIVE").expect(RCH);
        let files: Vec<&String> = cmd.get_many::<String>("FILES").expect(RCH).collect();
        Archiver::new(Backend::Lz77Huffman).add(std::path::Path::new(archive),&files).map(|_| ())
    } else {
        eprintln!("no subcommand given; see --help");
        std::process::exit(1);
    };

    if let Err(err) = &result {
        log::error!("{}",err);
    }
    result.map_err(|e| e.into())
}
