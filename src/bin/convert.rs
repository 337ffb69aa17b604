use clap::{Parser, ValueEnum};
use image::{DynamicImage, ImageFormat};
use owo_colors::OwoColorize;
use pi::PiFile;
use rayon::prelude::*;
use std::{fs, path::PathBuf, io::{self, BufReader, Read}};

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Png,
    Bmp,
}

#[derive(Parser)]
#[command(about = "Decode PI images made on Japanese personal computers")]
struct Arg {
    /// Output image format.
    #[arg(short, long, value_enum, default_value = "png")]
    format: OutputFormat,
    files: Vec<PathBuf>,
}

fn main() -> io::Result<()> {
    env_logger::init();
    let arg = Arg::parse();
    let (extension, format) = match arg.format {
        OutputFormat::Png => ("png", ImageFormat::Png),
        OutputFormat::Bmp => ("bmp", ImageFormat::Bmp),
    };

    arg.files.par_iter().for_each(|file| {
        let f = fs::File::open(file);
        if let Err(e) = f {
            println!("{} \"{}\" read: {}", " Failed".red().bold(), file.to_string_lossy(), e);
            return;
        }
        let mut reader = BufReader::new(f.unwrap());
        let pi_img = PiFile::read(reader.by_ref());
        if let Err(e) = pi_img {
            println!("{} \"{}\" decode: {}", " Failed".red().bold(), file.to_string_lossy(), e);
            return;
        }
        let img = DynamicImage::try_from(pi_img.unwrap());
        if let Err(e) = img {
            println!("{} \"{}\" convert: {}", " Failed".red().bold(), file.to_string_lossy(), e);
            return;
        }
        // determine output file path
        let output_path = {
            let mut tmp = file.clone();
            tmp.set_extension(extension);
            tmp
        };
        // write to file
        let result = img.unwrap().save_with_format(&output_path, format);
        if let Err(e) = result {
            println!("{} \"{}\" save: {}", " Failed".red().bold(), file.to_string_lossy(), e);
            return;
        }
        println!("{} \"{}\" -> \"{}\"", "Success".green().bold(), file.to_string_lossy(), output_path.to_string_lossy());
    });

    Ok(())
}
