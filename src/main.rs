use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use mfx_host::constants::MESH_MAIN_INPUT;
use mfx_host::host::EffectSession;
use mfx_host::model::config::{FrameConfig, HostConfig};
use mfx_host::model::mesh::MeshData;
use mfx_host::model::registry::ObjectKey;
use mfx_host::plugin::PluginLibrary;

fn main() -> Result<()> {
    let config = HostConfig::load()?;

    // Initialize logging to file; stdout carries the cooked meshes
    let log_dir = directories::ProjectDirs::from("", "", "mfxhost")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("/tmp"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "mfxhost.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .init();

    tracing::info!("mfxhost starting");

    let result = run(&config);
    if let Err(e) = &result {
        tracing::error!("mfxhost failed: {e:?}");
    }
    result
}

fn run(config: &HostConfig) -> Result<()> {
    let path = config.library_path();
    // SAFETY: the configured library is the plugin the user asked to run.
    let library = unsafe { PluginLibrary::open(&path) }.with_context(|| {
        format!(
            "could not load {}; check the path and the library's own dependencies",
            path.display()
        )
    })?;
    let count = library.plugin_count()?;
    tracing::info!("{} exports {count} plugins", path.display());

    let plugin = library.plugin(config.plugin.index)?;
    println!("plugin #{}: {}", config.plugin.index, plugin.info());

    let mut session = EffectSession::new(plugin, &config.host)?;
    session.load().context("OfxActionLoad")?;
    let descriptor = session.describe().context("OfxActionDescribe")?;
    for input in session.input_infos(descriptor)? {
        tracing::info!("input {} ({} requested attributes)", input.name, input.requested.len());
    }
    for param in session.param_infos(descriptor)? {
        tracing::info!("parameter {} ({})", param.name, param.ty.short_name());
    }

    let instance = session
        .create_instance(descriptor)
        .context("OfxActionCreateInstance")?;
    session.set_input_mesh(instance, MESH_MAIN_INPUT, &config.input.mesh_data())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, frame) in config.frames.iter().enumerate() {
        apply_frame(&mut session, instance, frame)
            .with_context(|| format!("frame {index}"))?;
        let mesh = session
            .cook(instance)
            .with_context(|| format!("cooking frame {index}"))?;
        print_mesh(&mut out, index, &mesh)?;
    }

    session.destroy_instance(instance)?;
    session.unload()?;
    Ok(())
}

/// Convert each edit against the declared parameter type and store it.
fn apply_frame(session: &mut EffectSession, instance: ObjectKey, frame: &FrameConfig) -> Result<()> {
    for (name, edit) in &frame.params {
        let ty = session
            .param_type(instance, name)
            .with_context(|| format!("parameter '{name}'"))?;
        let value = edit
            .to_value(ty)
            .with_context(|| format!("parameter '{name}'"))?;
        session.set_param(instance, name, value)?;
    }
    Ok(())
}

fn print_mesh(out: &mut impl Write, frame: usize, mesh: &MeshData) -> io::Result<()> {
    writeln!(
        out,
        "frame {frame}: {} points, {} corners, {} faces",
        mesh.positions.len(),
        mesh.corner_points.len(),
        mesh.face_sizes.len()
    )?;
    for (i, [x, y, z]) in mesh.positions.iter().enumerate() {
        writeln!(out, "  p{i} {x:.6} {y:.6} {z:.6}")?;
    }
    let mut corners = mesh.corner_points.iter();
    for (i, size) in mesh.face_sizes.iter().enumerate() {
        let face: Vec<String> = corners
            .by_ref()
            .take(usize::try_from(*size).unwrap_or(0))
            .map(i32::to_string)
            .collect();
        writeln!(out, "  f{i} {}", face.join(" "))?;
    }
    Ok(())
}
