//! Attribute, uniform and varying names shared by shader source and lookups.
//!
//! Generated GLSL declares inputs from [`ShaderInput`] and the location
//! resolver looks them up through the same table. A name spelled differently
//! on the two sides would not fail; the lookup would silently come back
//! empty, so nothing outside this module spells these strings.

/// Bumped whenever a name below changes.
pub const NAMES_VERSION: u32 = 1;

pub const A_NORMAL: &str = "a_normal";
pub const A_POSITION: &str = "a_position";
pub const A_TEX_COORD: &str = "a_tex_coord";

pub const U_COLOR: &str = "u_color";
pub const U_FACTOR: &str = "u_factor";
pub const U_MODEL: &str = "u_model";
pub const U_MV: &str = "u_mv";
pub const U_MV_IT: &str = "u_mv_it";
pub const U_MVP: &str = "u_mvp";
pub const U_OPACITY: &str = "u_opacity";
pub const U_RIGHT: &str = "u_right";
pub const U_TEXTURE: &str = "u_texture";
pub const U_VIEW_I: &str = "u_view_i";

pub const V_TEX_COORD: &str = "v_tex_coord";

/// How an input reaches the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Per-vertex input to the vertex stage
    Attribute,
    /// Per-draw constant
    Uniform,
    /// Interpolated from vertex to fragment stage
    Varying,
}

/// Every named shader input the material shaders know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderInput {
    Position,
    Normal,
    TexCoord,
    Model,
    ModelView,
    ModelViewInverseTranspose,
    ModelViewProjection,
    ViewInverse,
    Texture,
    Color,
    Opacity,
    Right,
    Factor,
    VaryingTexCoord,
}

impl ShaderInput {
    pub const ALL: [ShaderInput; 14] = [
        ShaderInput::Position,
        ShaderInput::Normal,
        ShaderInput::TexCoord,
        ShaderInput::Model,
        ShaderInput::ModelView,
        ShaderInput::ModelViewInverseTranspose,
        ShaderInput::ModelViewProjection,
        ShaderInput::ViewInverse,
        ShaderInput::Texture,
        ShaderInput::Color,
        ShaderInput::Opacity,
        ShaderInput::Right,
        ShaderInput::Factor,
        ShaderInput::VaryingTexCoord,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShaderInput::Position => A_POSITION,
            ShaderInput::Normal => A_NORMAL,
            ShaderInput::TexCoord => A_TEX_COORD,
            ShaderInput::Model => U_MODEL,
            ShaderInput::ModelView => U_MV,
            ShaderInput::ModelViewInverseTranspose => U_MV_IT,
            ShaderInput::ModelViewProjection => U_MVP,
            ShaderInput::ViewInverse => U_VIEW_I,
            ShaderInput::Texture => U_TEXTURE,
            ShaderInput::Color => U_COLOR,
            ShaderInput::Opacity => U_OPACITY,
            ShaderInput::Right => U_RIGHT,
            ShaderInput::Factor => U_FACTOR,
            ShaderInput::VaryingTexCoord => V_TEX_COORD,
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            ShaderInput::Position | ShaderInput::Normal | ShaderInput::TexCoord => {
                InputKind::Attribute
            }
            ShaderInput::VaryingTexCoord => InputKind::Varying,
            _ => InputKind::Uniform,
        }
    }

    /// Number of floats per vertex for attributes as stored in a mesh
    pub fn components(&self) -> u32 {
        match self {
            ShaderInput::Position | ShaderInput::Normal => 3,
            ShaderInput::TexCoord => 2,
            _ => 0,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|input| input.name() == name)
    }
}

impl std::fmt::Display for ShaderInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
