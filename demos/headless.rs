//! # Headless Demo
//!
//! Demonstrates:
//! - Building all four material shaders through `ShaderManager`
//! - Rendering a skybox, a reflective sphere, a video quad and a stereo quad
//! - Choosing the vertex submission path from the command line
//! - Reading draw reports and the recorded command stream
//!
//! Runs on the recording backend, so no GPU or window is needed:
//!
//! ```bash
//! RUST_LOG=debug cargo run --example headless -- --draw-path client --frames 3
//! ```

use clap::Parser;
use glam::{Mat4, Vec3};

use material_shaders::backend::{Capabilities, GlCommand, RecordingBackend, TextureTarget};
use material_shaders::{
    DrawPath, Material, Mesh, RenderData, RendererConfig, ShaderError, ShaderManager, Texture,
    UnresolvedInputPolicy,
};

/// Vertex submission path selection for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum CliDrawPath {
    /// Use vertex arrays when the context supports them.
    #[default]
    Auto,
    /// Cached vertex array objects (GL ES 3.0).
    Vao,
    /// Client-side arrays on every draw (GL ES 2.0).
    Client,
}

impl From<CliDrawPath> for Option<DrawPath> {
    fn from(cli: CliDrawPath) -> Self {
        match cli {
            CliDrawPath::Auto => None,
            CliDrawPath::Vao => Some(DrawPath::VertexArray),
            CliDrawPath::Client => Some(DrawPath::ClientArrays),
        }
    }
}

/// Material shaders headless demo.
#[derive(Parser, Debug)]
#[command(name = "headless", about = "Render the material shader family without a GPU", version)]
struct Args {
    /// Vertex submission path.
    #[arg(long, default_value = "auto", value_enum)]
    draw_path: CliDrawPath,

    /// Number of frames to render.
    #[arg(long, default_value = "2")]
    frames: u32,

    /// Fail shader construction when the linker drops a declared input.
    #[arg(long)]
    reject_unresolved: bool,

    /// Report GL ES 2.0 capabilities (no vertex array objects).
    #[arg(long)]
    gles2: bool,
}

struct Scene {
    skybox: RenderData,
    sphere: RenderData,
    video: RenderData,
    stereo: RenderData,
}

impl Scene {
    fn new(backend: &RecordingBackend) -> Self {
        let environment = Texture::cube_map(backend.create_texture());
        let video = Texture::external(backend.create_texture());
        let stereo = Texture::texture_2d(backend.create_texture());

        Self {
            skybox: RenderData::new(
                Mesh::cube(),
                Material::new("skybox").with_main_texture(environment),
            ),
            sphere: RenderData::new(
                Mesh::sphere(32, 16),
                Material::new("chrome")
                    .with_main_texture(environment)
                    .with_color(Vec3::new(0.9, 0.9, 1.0)),
            ),
            video: RenderData::new(
                Mesh::quad(),
                Material::new("video").with_main_texture(video),
            ),
            stereo: RenderData::new(
                Mesh::quad(),
                Material::new("stereo photo")
                    .with_main_texture(stereo)
                    .with_opacity(0.8),
            ),
        }
    }

    fn release(&self, backend: &RecordingBackend) {
        for data in [&self.skybox, &self.sphere, &self.video, &self.stereo] {
            data.mesh().release(backend);
        }
    }
}

fn render_frame(
    manager: &mut ShaderManager<RecordingBackend>,
    scene: &Scene,
    frame: u32,
) -> Result<u32, ShaderError> {
    let angle = frame as f32 * 0.1;
    let projection = Mat4::perspective_rh_gl(90f32.to_radians(), 1.0, 0.1, 100.0);
    let view = Mat4::from_rotation_y(angle);
    let view_inverse = view.inverse();
    let mut elements = 0;

    // Skybox follows the camera rotation only
    let model = Mat4::from_scale(Vec3::splat(50.0));
    let mvp = projection * view * model;
    elements += manager
        .cubemap_shader()?
        .render(&model, &mvp, &scene.skybox)?
        .element_count;

    let model = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0));
    let mv = view * model;
    let mv_it = mv.inverse().transpose();
    let mvp = projection * mv;
    elements += manager
        .cubemap_reflection_shader()?
        .render(&mv, &mv_it, &view_inverse, &mvp, &scene.sphere)?
        .element_count;

    let model = Mat4::from_translation(Vec3::new(-1.5, 0.0, -2.0));
    let mvp = projection * view * model;
    elements += manager
        .oes_shader()?
        .render(&mvp, &scene.video)?
        .element_count;

    let model = Mat4::from_translation(Vec3::new(1.5, 0.0, -2.0));
    let mvp = projection * view * model;
    for right in [false, true] {
        let report = manager
            .unlit_vertical_stereo_shader()?
            .render(&mvp, &scene.stereo, right)?;
        elements += report.element_count;
        for error in &report.gl_errors {
            log::warn!("frame {}: {}", frame, error);
        }
    }

    Ok(elements)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let capabilities = if args.gles2 {
        Capabilities::GLES2
    } else {
        Capabilities::GLES3
    };
    let backend = RecordingBackend::with_capabilities(capabilities);

    let mut config = RendererConfig::default().with_label("headless");
    config.draw_path = args.draw_path.into();
    if args.reject_unresolved {
        config = config.with_unresolved_inputs(UnresolvedInputPolicy::Reject);
    }

    log::info!(
        "Starting headless demo on {} ({:?}, {} frames)",
        backend.name(),
        args.draw_path,
        args.frames
    );

    let mut manager = ShaderManager::new(&backend, config);
    let scene = Scene::new(&backend);

    for frame in 0..args.frames {
        match render_frame(&mut manager, &scene, frame) {
            Ok(elements) => log::info!("frame {}: {} indices drawn", frame, elements),
            Err(err) => {
                log::error!("frame {} failed: {}", frame, err);
                break;
            }
        }
    }

    manager.recycle_all();
    scene.release(&backend);

    let commands = backend.commands();
    let draws = commands.iter().filter(|c| c.is_draw()).count();
    let vertex_arrays = commands
        .iter()
        .filter(|c| matches!(c, GlCommand::CreateVertexArray(_)))
        .count();
    log::info!(
        "{} commands recorded: {} draws, {} vertex arrays created",
        commands.len(),
        draws,
        vertex_arrays
    );
    log::info!(
        "live objects after shutdown: {} programs, {} buffers, {} vertex arrays",
        backend.live_programs(),
        backend.live_buffers(),
        backend.live_vertex_arrays()
    );

    // Mismatched target: the shader refuses before any GPU call
    let wrong = RenderData::new(
        Mesh::quad(),
        Material::new("wrong").with_main_texture(Texture::new(
            backend.create_texture(),
            TextureTarget::Texture2D,
        )),
    );
    if let Ok(shader) = manager.oes_shader() {
        if let Err(err) = shader.render(&Mat4::IDENTITY, &wrong) {
            log::info!("expected rejection: {}", err);
        }
    }
    manager.recycle_all();
}
