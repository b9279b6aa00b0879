use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

use emit::{emit_includes, Options};
use layout::Layouts;
use parse::parse_translation_unit;
use pp::Preprocessor;

#[derive(Parser, Debug)]
#[command(
    name = "amigen",
    about = "Converts C structs, enums and defines to Amiga OS assembler include definitions",
    version
)]
struct Cli {
    /// Input .h/.c file to convert
    input: PathBuf,
    /// Generate build-time offset/size tests
    #[arg(short = 't', long = "tests")]
    gen_tests: bool,
    /// Defines in the form NAME or NAME=VALUE
    #[arg(short = 'D', value_name = "NAME[=VALUE]")]
    define: Vec<String>,
    /// Undefine macro NAME
    #[arg(short = 'U', value_name = "NAME")]
    undef: Vec<String>,
    /// Add an include search directory (repeatable)
    #[arg(short = 'I', value_name = "DIR")]
    include: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(&cli)
}

fn apply_defines_undefs(pp: &mut Preprocessor, defines: &[String], undefs: &[String]) {
    for d in defines {
        if let Some((name, val)) = d.split_once('=') {
            pp.define_object(name, val);
        } else {
            pp.define_object(d, "1");
        }
    }
    for u in undefs {
        pp.undef(u);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.input.exists() {
        return Err(anyhow!("input file not found: {}", cli.input.display()));
    }

    let mut pp = Preprocessor::new();
    apply_defines_undefs(&mut pp, &cli.define, &cli.undef);
    let pre = pp.expand_file(&cli.input, &cli.include)?;

    let tu = parse_translation_unit(&pre.text)?;
    let lay = Layouts::build(&tu)?;

    let opts = Options {
        gen_tests: cli.gen_tests,
    };
    let text = emit_includes(&cli.input, &tu, &lay, &pre, &opts)?;
    print!("{}", text);
    Ok(())
}
