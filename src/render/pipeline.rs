use web_sys::{
    WebGl2RenderingContext, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlTexture,
    WebGlVertexArrayObject, WebGlUniformLocation,
};
use crate::camera::OrbitCamera;
use crate::math::Mat4;
use crate::mesh::{Mesh, VERTEX_STRIDE};
use crate::scene::{LightingConfig, ScenePart};
use super::webgl::WebGLContext;
use super::shaders::*;

/// Cached uniform locations for the mesh shader
struct MeshUniforms {
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    camera_pos: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
    key_dir: Option<WebGlUniformLocation>,
    key_color: Option<WebGlUniformLocation>,
    fill_dir: Option<WebGlUniformLocation>,
    fill_color: Option<WebGlUniformLocation>,
    shininess: Option<WebGlUniformLocation>,
    fog_color: Option<WebGlUniformLocation>,
    fog_range: Option<WebGlUniformLocation>,
    light_space: Option<WebGlUniformLocation>,
    shadow_map: Option<WebGlUniformLocation>,
    shadow_bias: Option<WebGlUniformLocation>,
    receive_shadow: Option<WebGlUniformLocation>,
}

impl MeshUniforms {
    fn locate(ctx: &WebGLContext, program: &WebGlProgram) -> Self {
        let loc = |name: &str| ctx.uniform_location(program, name);
        Self {
            view: loc("u_view"),
            projection: loc("u_projection"),
            camera_pos: loc("u_camera_pos"),
            ambient: loc("u_ambient"),
            key_dir: loc("u_key_dir"),
            key_color: loc("u_key_color"),
            fill_dir: loc("u_fill_dir"),
            fill_color: loc("u_fill_color"),
            shininess: loc("u_shininess"),
            fog_color: loc("u_fog_color"),
            fog_range: loc("u_fog_range"),
            light_space: loc("u_light_space"),
            shadow_map: loc("u_shadow_map"),
            shadow_bias: loc("u_shadow_bias"),
            receive_shadow: loc("u_receive_shadow"),
        }
    }
}

/// A mesh resident on the GPU
struct GpuMesh {
    vao: WebGlVertexArrayObject,
    vertex_buffer: WebGlBuffer,
    index_buffer: WebGlBuffer,
    index_count: i32,
}

impl GpuMesh {
    fn upload(ctx: &WebGLContext, mesh: &Mesh) -> Result<Self, String> {
        let gl = &ctx.gl;

        let vao = ctx.create_vao()?;
        gl.bind_vertex_array(Some(&vao));

        let vertex_data = mesh.vertex_data();
        let vertex_buffer = ctx.create_buffer_f32(&vertex_data, WebGl2RenderingContext::STATIC_DRAW)?;
        let index_data = mesh.index_data();
        let index_buffer = ctx.create_index_buffer(index_data, WebGl2RenderingContext::STATIC_DRAW)?;

        gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, Some(&vertex_buffer));
        gl.bind_buffer(WebGl2RenderingContext::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));

        // Layout: position(3) + normal(3) + color(3) + opacity(1) + specular(1)
        let stride = (VERTEX_STRIDE * 4) as i32;
        let attributes: [(u32, i32, i32); 5] = [
            (0, 3, 0),
            (1, 3, 12),
            (2, 3, 24),
            (3, 1, 36),
            (4, 1, 40),
        ];
        for (location, size, offset) in attributes {
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_with_i32(
                location,
                size,
                WebGl2RenderingContext::FLOAT,
                false,
                stride,
                offset,
            );
        }

        gl.bind_vertex_array(None);

        Ok(Self {
            vao,
            vertex_buffer,
            index_buffer,
            index_count: index_data.len() as i32,
        })
    }

    fn draw(&self, gl: &WebGl2RenderingContext) {
        gl.bind_vertex_array(Some(&self.vao));
        gl.draw_elements_with_i32(
            WebGl2RenderingContext::TRIANGLES,
            self.index_count,
            WebGl2RenderingContext::UNSIGNED_INT,
            0,
        );
        gl.bind_vertex_array(None);
    }

    fn release(self, gl: &WebGl2RenderingContext) {
        gl.delete_vertex_array(Some(&self.vao));
        gl.delete_buffer(Some(&self.vertex_buffer));
        gl.delete_buffer(Some(&self.index_buffer));
    }
}

/// A scene part resident on the GPU
struct GpuPart {
    mesh: GpuMesh,
    cast_shadow: bool,
    receive_shadow: bool,
    blended: bool,
}

impl GpuPart {
    fn upload(ctx: &WebGLContext, part: &ScenePart) -> Result<Self, String> {
        Ok(Self {
            mesh: GpuMesh::upload(ctx, &part.mesh)?,
            cast_shadow: part.cast_shadow,
            receive_shadow: part.receive_shadow,
            blended: part.blended,
        })
    }
}

/// Key-light depth map and the program that fills it
struct ShadowMap {
    program: WebGlProgram,
    light_space_location: Option<WebGlUniformLocation>,
    texture: WebGlTexture,
    framebuffer: WebGlFramebuffer,
    size: i32,
    light_space: Mat4,
    bias: f32,
}

impl ShadowMap {
    fn new(ctx: &WebGLContext, lighting: &LightingConfig) -> Result<Self, String> {
        let program = ctx.create_program(SHADOW_VERTEX_SHADER, SHADOW_FRAGMENT_SHADER)?;
        let size = lighting.shadow.map_size as i32;
        let texture = ctx.create_depth_texture(size)?;
        let framebuffer = ctx.create_depth_framebuffer(&texture)?;

        Ok(Self {
            light_space_location: ctx.uniform_location(&program, "u_light_space"),
            program,
            texture,
            framebuffer,
            size,
            light_space: lighting.light_space(),
            bias: lighting.shadow.bias,
        })
    }
}

/// Forward renderer for the tree scene
///
/// Each frame first renders casting parts into the key-light depth map, then
/// draws opaque parts and finally blended parts with depth writes off so
/// overlapping leaf clusters blend.
pub struct RenderPipeline {
    ctx: WebGLContext,
    program: WebGlProgram,
    uniforms: MeshUniforms,
    /// None when shadows are off or the depth target is unsupported
    shadow: Option<ShadowMap>,

    scenery: Vec<GpuPart>,
    ornaments: Vec<GpuPart>,

    lighting: LightingConfig,

    // Drawing buffer size in device pixels
    width: i32,
    height: i32,
}

impl RenderPipeline {
    pub fn new(
        gl: WebGl2RenderingContext,
        width: i32,
        height: i32,
        lighting: LightingConfig,
    ) -> Result<Self, String> {
        let ctx = WebGLContext::new(gl);
        let program = ctx.create_program(MESH_VERTEX_SHADER, MESH_FRAGMENT_SHADER)?;
        let uniforms = MeshUniforms::locate(&ctx, &program);

        let shadow = if lighting.shadows_enabled() {
            match ShadowMap::new(&ctx, &lighting) {
                Ok(shadow) => Some(shadow),
                Err(e) => {
                    log::warn!("Rendering without shadows: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            ctx,
            program,
            uniforms,
            shadow,
            scenery: Vec::new(),
            ornaments: Vec::new(),
            lighting,
            width: width.max(1),
            height: height.max(1),
        })
    }

    /// Upload the static tree; called once per scene
    pub fn upload_scenery(&mut self, parts: &[ScenePart]) -> Result<(), String> {
        let scenery = self.upload_parts(parts)?;
        let old = std::mem::replace(&mut self.scenery, scenery);
        self.release(old);
        Ok(())
    }

    /// Upload the ornament parts, replacing any previous ones
    pub fn upload_ornaments(&mut self, parts: &[ScenePart]) -> Result<(), String> {
        let ornaments = self.upload_parts(parts)?;
        let old = std::mem::replace(&mut self.ornaments, ornaments);
        self.release(old);
        Ok(())
    }

    fn upload_parts(&self, parts: &[ScenePart]) -> Result<Vec<GpuPart>, String> {
        let mut uploaded = Vec::with_capacity(parts.len());
        for part in parts.iter().filter(|p| !p.is_empty()) {
            match GpuPart::upload(&self.ctx, part) {
                Ok(gpu) => uploaded.push(gpu),
                Err(e) => {
                    self.release(uploaded);
                    return Err(e);
                }
            }
        }
        Ok(uploaded)
    }

    fn release(&self, parts: Vec<GpuPart>) {
        for part in parts {
            part.mesh.release(&self.ctx.gl);
        }
    }

    fn parts(&self) -> impl Iterator<Item = &GpuPart> {
        self.scenery.iter().chain(self.ornaments.iter())
    }

    pub fn shadows_active(&self) -> bool {
        self.shadow.is_some()
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Render a frame
    pub fn render(&self, camera: &OrbitCamera) {
        if let Some(shadow) = &self.shadow {
            self.render_shadow_map(shadow);
        }

        let gl = &self.ctx.gl;
        let lighting = &self.lighting;

        let projection = camera.projection(self.aspect());
        let view = camera.view();
        let eye = camera.position();

        self.ctx.begin_frame(self.width, self.height, lighting.background.to_array());

        gl.use_program(Some(&self.program));
        let u = &self.uniforms;
        self.ctx.set_mat4(u.view.as_ref(), view.as_slice());
        self.ctx.set_mat4(u.projection.as_ref(), projection.as_slice());
        self.ctx.set_vec3(u.camera_pos.as_ref(), eye.to_array());
        self.ctx.set_vec3(u.ambient.as_ref(), lighting.ambient.radiance());
        self.ctx.set_vec3(u.key_dir.as_ref(), lighting.key.direction().to_array());
        self.ctx.set_vec3(u.key_color.as_ref(), lighting.key.radiance());
        self.ctx.set_vec3(u.fill_dir.as_ref(), lighting.fill.direction().to_array());
        self.ctx.set_vec3(u.fill_color.as_ref(), lighting.fill.radiance());
        self.ctx.set_float(u.shininess.as_ref(), lighting.shininess);
        self.ctx.set_vec3(u.fog_color.as_ref(), lighting.fog_color.to_array());
        self.ctx.set_vec2(u.fog_range.as_ref(), lighting.fog_near, lighting.fog_far);

        gl.active_texture(WebGl2RenderingContext::TEXTURE0);
        self.ctx.set_int(u.shadow_map.as_ref(), 0);
        if let Some(shadow) = &self.shadow {
            gl.bind_texture(WebGl2RenderingContext::TEXTURE_2D, Some(&shadow.texture));
            self.ctx.set_mat4(u.light_space.as_ref(), shadow.light_space.as_slice());
            self.ctx.set_float(u.shadow_bias.as_ref(), shadow.bias);
        }

        for part in self.parts().filter(|p| !p.blended) {
            self.draw_part(part);
        }

        self.ctx.set_blending(true);
        gl.depth_mask(false);
        for part in self.parts().filter(|p| p.blended) {
            self.draw_part(part);
        }
        gl.depth_mask(true);
        self.ctx.set_blending(false);
    }

    fn draw_part(&self, part: &GpuPart) {
        // Without a map the sampler reads zero depth, so nothing may receive
        let receive = part.receive_shadow && self.shadow.is_some();
        self.ctx.set_int(self.uniforms.receive_shadow.as_ref(), receive as i32);
        part.mesh.draw(&self.ctx.gl);
    }

    fn render_shadow_map(&self, shadow: &ShadowMap) {
        let gl = &self.ctx.gl;

        // The map must not stay bound as a texture while it is the target
        gl.active_texture(WebGl2RenderingContext::TEXTURE0);
        gl.bind_texture(WebGl2RenderingContext::TEXTURE_2D, None);

        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, Some(&shadow.framebuffer));
        gl.viewport(0, 0, shadow.size, shadow.size);
        gl.enable(WebGl2RenderingContext::DEPTH_TEST);
        gl.depth_func(WebGl2RenderingContext::LEQUAL);
        gl.depth_mask(true);
        self.ctx.set_blending(false);
        gl.clear(WebGl2RenderingContext::DEPTH_BUFFER_BIT);

        gl.use_program(Some(&shadow.program));
        self.ctx.set_mat4(shadow.light_space_location.as_ref(), shadow.light_space.as_slice());
        for part in self.parts().filter(|p| p.cast_shadow) {
            part.mesh.draw(gl);
        }

        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, None);
    }

    /// Resize the drawing buffer
    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }
}
