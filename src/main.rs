use anyhow::Result;
use discourse_coder::{init_tracing_once, load_posts_dir, CodingOptions, CodingRun};
use std::fs;
use std::path::PathBuf;

const DATA_ROOT: &str = "./data";
const OUT_ROOT: &str = "./coding_out";

fn main() -> Result<()> {
    init_tracing_once();
    let data_dir = PathBuf::from(DATA_ROOT);
    let out_dir = PathBuf::from(OUT_ROOT);
    fs::create_dir_all(&out_dir)?;

    let opts = CodingOptions::from_env();
    let loaded = load_posts_dir(&data_dir, opts.min_year)?;
    let posts = loaded.posts;

    let thematic = CodingRun::thematic(opts.clone()).run(&posts)?;
    let written = thematic.export(&out_dir, "thematic")?;
    tracing::info!("Thematic coding: {} posts, {} files", posts.len(), written.len());

    let stress = CodingRun::stress_deep_dive(opts).run(&posts)?;
    let written = stress.export(&out_dir, "stress")?;
    tracing::info!("Stress deep dive: {} posts, {} files", posts.len(), written.len());

    Ok(())
}
