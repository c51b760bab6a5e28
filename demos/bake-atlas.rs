// font-atlas/demos/bake-atlas.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use font_atlas::atlas::{AtlasConfig, FontAtlas};
use font_atlas::cache::{AtlasCache, CacheOutcome};
use font_atlas::handle::FontHandle;
use font_atlas::layout::lay_out_text;
use font_atlas::loaders::ttf::Font;
use font_atlas::mesh::TextMeshBuilder;
use pathfinder_geometry::rect::RectF;
use pathfinder_geometry::vector::Vector2F;
use std::process;

fn get_args() -> ArgMatches {
    let font_arg = Arg::new("FONT")
        .help("Path to a TrueType or OpenType font")
        .required(true)
        .index(1);
    let size_arg = Arg::new("SIZE")
        .help("Nominal point size")
        .default_value("32")
        .index(2);
    let text_arg = Arg::new("text")
        .help("Text to build a mesh for")
        .short('t')
        .long("text")
        .default_value("Hello, atlas!");
    let output_arg = Arg::new("output")
        .help("Where to write the texture as a PNG")
        .short('o')
        .long("output")
        .default_value("atlas.png");
    let working_arg = Arg::new("working-resolution")
        .help("Side length of the rasterization canvas")
        .long("working-resolution")
        .default_value("4096");
    let storage_arg = Arg::new("storage-resolution")
        .help("Side length of the stored texture")
        .long("storage-resolution")
        .default_value("2048");
    let no_cache_arg = Arg::new("no-cache")
        .help("Always bake, ignoring and not updating the cache")
        .long("no-cache")
        .action(ArgAction::SetTrue);
    let preview_arg = Arg::new("preview")
        .help("Print the first glyph of the text as shaded blocks")
        .short('p')
        .long("preview")
        .action(ArgAction::SetTrue);
    Command::new("bake-atlas")
        .version("0.1")
        .author("The Pathfinder Project Developers")
        .about("Bakes a font into a signed distance field atlas with `font-atlas`")
        .arg(font_arg)
        .arg(size_arg)
        .arg(text_arg)
        .arg(output_arg)
        .arg(working_arg)
        .arg(storage_arg)
        .arg(no_cache_arg)
        .arg(preview_arg)
        .get_matches()
}

fn main() {
    env_logger::init();
    let matches = get_args();

    let path = matches.get_one::<String>("FONT").unwrap();
    let size: f32 = matches.get_one::<String>("SIZE").unwrap().parse().unwrap();
    let text = matches.get_one::<String>("text").unwrap();
    let output = matches.get_one::<String>("output").unwrap();
    let working: u32 = matches
        .get_one::<String>("working-resolution")
        .unwrap()
        .parse()
        .unwrap();
    let storage: u32 = matches
        .get_one::<String>("storage-resolution")
        .unwrap()
        .parse()
        .unwrap();

    let font = match Font::from_path(path, 0) {
        Ok(font) => font,
        Err(error) => {
            eprintln!("{} {}: {}", "error:".red().bold(), path, error);
            process::exit(1);
        }
    };
    println!("{} {} ({} glyphs)", "font:".bold(), font.family_name(), font.glyph_count());

    let config = AtlasConfig::with_resolutions(working, storage);
    let cache = if matches.get_flag("no-cache") {
        None
    } else {
        AtlasCache::in_user_cache_dir()
    };
    let result = match cache {
        Some(ref cache) => cache.load_or_bake(&font, size, &config).map(|(atlas, outcome)| {
            match outcome {
                CacheOutcome::Restored => println!("{}", "restored from cache".green()),
                CacheOutcome::Baked { write: Ok(path) } => {
                    println!("{} {}", "baked, cached in".green(), path.display())
                }
                CacheOutcome::Baked { write: Err(error) } => {
                    println!("{} {}", "baked, not cached:".yellow(), error)
                }
            }
            atlas
        }),
        None => FontAtlas::bake(&font, size, &config),
    };
    let atlas = match result {
        Ok(atlas) => atlas,
        Err(error) => {
            eprintln!("{} {}", "bake failed:".red().bold(), error);
            process::exit(1);
        }
    };
    println!(
        "{} nominal {}pt, fitted {}pt, {}x{} texels, {} descriptors",
        "atlas:".bold(),
        atlas.nominal_point_size(),
        atlas.fitted_point_size(),
        atlas.storage_resolution(),
        atlas.storage_resolution(),
        atlas.glyph_descriptors().len()
    );

    match atlas.save_png(output) {
        Ok(()) => println!("{} {}", "wrote".bold(), output),
        Err(error) => eprintln!("{} {}", "failed to write PNG:".red(), error),
    }

    let rect = RectF::new(Vector2F::zero(), Vector2F::new(1024.0, 1024.0));
    let placed = lay_out_text(&font, text, size, rect);
    match TextMeshBuilder::new(&atlas).build(&placed) {
        Ok(mesh) => println!(
            "{} {} quads, {} vertex bytes, {} index bytes",
            "mesh:".bold(),
            mesh.glyph_count(),
            mesh.vertex_bytes().len(),
            mesh.index_bytes().len()
        ),
        Err(error) => eprintln!("{} {}", "mesh failed:".red(), error),
    }

    if matches.get_flag("preview") {
        if let Some(glyph) = placed.first() {
            print_glyph(&atlas, glyph.glyph_id);
        }
    }
}

fn print_glyph(atlas: &FontAtlas, glyph_id: u32) {
    let descriptor = match atlas.glyph_descriptor(glyph_id) {
        Ok(descriptor) => descriptor,
        Err(error) => {
            eprintln!("{}", error);
            return;
        }
    };
    let resolution = atlas.storage_resolution() as f32;
    let (min, max) = (
        descriptor.top_left_uv * resolution,
        descriptor.bottom_right_uv * resolution,
    );
    let stride = atlas.storage_resolution() as usize;
    println!("glyph {}:", glyph_id);
    for y in min.y() as usize..max.y().ceil() as usize {
        let mut line = String::new();
        for x in min.x() as usize..max.x().ceil() as usize {
            let shade = shade(atlas.texture_bytes()[y * stride + x]);
            line.push(shade);
            line.push(shade);
        }
        println!("{}", line);
    }
}

fn shade(value: u8) -> char {
    match value {
        0..=63 => ' ',
        64..=127 => '░',
        128..=191 => '▒',
        192..=239 => '▓',
        _ => '█',
    }
}
