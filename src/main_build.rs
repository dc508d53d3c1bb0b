// Copyright (C) 2020-2026 Andy Kurnia.

use skrafl::{alphabet, build, error, kwg, lexicon};

fn alphabet_by_language(language: &str) -> error::Returns<alphabet::Alphabet<'static>> {
    match language {
        "english" => Ok(alphabet::make_english_alphabet()),
        "icelandic" => Ok(alphabet::make_icelandic_alphabet()),
        _ => {
            skrafl::return_error!(format!("invalid language {:?}", language));
        }
    }
}

fn build_kwg(
    language: &str,
    build_format: build::BuildFormat,
    input_filename: &str,
    output_filename: &str,
) -> error::Returns<()> {
    let alphabet = alphabet_by_language(language)?;
    let kwg = lexicon::kwg_from_word_list(
        &alphabet,
        &std::fs::read_to_string(input_filename)?,
        build_format,
        false,
    )?;
    let bin = kwg.to_bytes();
    tracing::info!(
        output_filename,
        nodes = kwg.len(),
        words = kwg.count_dawg_words(),
        "writing lexicon"
    );
    std::fs::write(output_filename, bin)?;
    Ok(())
}

fn dump_kwg(language: &str, input_filename: &str, output_filename: &str) -> error::Returns<()> {
    let alphabet = alphabet_by_language(language)?;
    let kwg = kwg::Kwg::from_bytes(&std::fs::read(input_filename)?)?;
    let mut s = String::new();
    kwg.for_each_word(|word| {
        s.push_str(&alphabet.fmt_word(word));
        s.push('\n');
    });
    std::fs::write(output_filename, s)?;
    Ok(())
}

pub fn main() -> error::Returns<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = std::env::args().collect::<Vec<_>>();
    if args.len() < 4 {
        println!(
            "args:
  english-kwg CSW21.txt CSW21.kwg
    read word list (one word per line) and build a gaddawg
  english-kwg-dawg CSW21.txt outfile.dawg
    same, but the dawg part only (not usable for move generation)
  english-dump CSW21.kwg CSW21.txt
    write the word list back out
  icelandic-kwg, icelandic-kwg-dawg, icelandic-dump
    same, for Icelandic"
        );
        return Ok(());
    }
    let t0 = std::time::Instant::now();
    let (language, command) = args[1].split_once('-').unwrap_or((args[1].as_str(), ""));
    match command {
        "kwg" => build_kwg(language, build::BuildFormat::Gaddawg, &args[2], &args[3])?,
        "kwg-dawg" => build_kwg(language, build::BuildFormat::DawgOnly, &args[2], &args[3])?,
        "dump" => dump_kwg(language, &args[2], &args[3])?,
        _ => {
            skrafl::return_error!(format!("invalid command {:?}", args[1]));
        }
    }
    tracing::info!(elapsed_ms = t0.elapsed().as_millis() as u64, "done");
    Ok(())
}
