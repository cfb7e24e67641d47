use js_sys::Object;
use web_sys::{
    WebGl2RenderingContext as GL, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlShader,
    WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

/// Thin helper layer over a WebGL2 context
pub struct WebGLContext {
    pub gl: GL,
}

impl WebGLContext {
    pub fn new(gl: GL) -> Self {
        Self { gl }
    }

    /// Compile one shader stage
    pub fn compile_shader(&self, stage: u32, source: &str) -> Result<WebGlShader, String> {
        let shader = self.gl.create_shader(stage).ok_or("Failed to create shader")?;
        self.gl.shader_source(&shader, source);
        self.gl.compile_shader(&shader);

        if self.gl.get_shader_parameter(&shader, GL::COMPILE_STATUS).as_bool() == Some(true) {
            return Ok(shader);
        }
        let log = self.gl.get_shader_info_log(&shader).unwrap_or_default();
        self.gl.delete_shader(Some(&shader));
        let stage_name = if stage == GL::VERTEX_SHADER { "vertex" } else { "fragment" };
        Err(format!("{} shader failed to compile: {}", stage_name, log))
    }

    /// Compile and link a vertex/fragment pair
    pub fn create_program(&self, vertex: &str, fragment: &str) -> Result<WebGlProgram, String> {
        let stages = [
            self.compile_shader(GL::VERTEX_SHADER, vertex)?,
            self.compile_shader(GL::FRAGMENT_SHADER, fragment)?,
        ];
        let program = self.gl.create_program().ok_or("Failed to create program")?;
        for shader in &stages {
            self.gl.attach_shader(&program, shader);
        }
        self.gl.link_program(&program);

        // Linked programs keep their own copy
        for shader in &stages {
            self.gl.delete_shader(Some(shader));
        }

        if self.gl.get_program_parameter(&program, GL::LINK_STATUS).as_bool() == Some(true) {
            return Ok(program);
        }
        let log = self.gl.get_program_info_log(&program).unwrap_or_default();
        self.gl.delete_program(Some(&program));
        Err(format!("Program failed to link: {}", log))
    }

    fn upload(&self, target: u32, view: &Object, usage: u32) -> Result<WebGlBuffer, String> {
        let buffer = self.gl.create_buffer().ok_or("Failed to create buffer")?;
        self.gl.bind_buffer(target, Some(&buffer));
        self.gl.buffer_data_with_array_buffer_view(target, view, usage);
        self.gl.bind_buffer(target, None);
        Ok(buffer)
    }

    /// Upload interleaved vertex floats
    pub fn create_buffer_f32(&self, data: &[f32], usage: u32) -> Result<WebGlBuffer, String> {
        // Safety: the view is consumed by buffer_data before any allocation
        // can move wasm memory
        let view = unsafe { js_sys::Float32Array::view(data) };
        self.upload(GL::ARRAY_BUFFER, &view, usage)
    }

    /// Upload 32-bit triangle indices
    pub fn create_index_buffer(&self, data: &[u32], usage: u32) -> Result<WebGlBuffer, String> {
        let view = unsafe { js_sys::Uint32Array::view(data) };
        self.upload(GL::ELEMENT_ARRAY_BUFFER, &view, usage)
    }

    pub fn create_vao(&self) -> Result<WebGlVertexArrayObject, String> {
        self.gl.create_vertex_array().ok_or_else(|| "Failed to create VAO".to_string())
    }

    /// Square 24-bit depth texture, point sampled and edge clamped
    pub fn create_depth_texture(&self, size: i32) -> Result<WebGlTexture, String> {
        let texture = self.gl.create_texture().ok_or("Failed to create depth texture")?;
        self.gl.bind_texture(GL::TEXTURE_2D, Some(&texture));

        self.gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                GL::TEXTURE_2D,
                0,
                GL::DEPTH_COMPONENT24 as i32,
                size,
                size,
                0,
                GL::DEPTH_COMPONENT,
                GL::UNSIGNED_INT,
                None,
            )
            .map_err(|e| format!("Failed to allocate depth texture: {:?}", e))?;

        // Depth formats are not filterable
        for (param, value) in [
            (GL::TEXTURE_MIN_FILTER, GL::NEAREST),
            (GL::TEXTURE_MAG_FILTER, GL::NEAREST),
            (GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE),
            (GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE),
        ] {
            self.gl.tex_parameteri(GL::TEXTURE_2D, param, value as i32);
        }

        self.gl.bind_texture(GL::TEXTURE_2D, None);
        Ok(texture)
    }

    /// Framebuffer rendering depth only into `texture`
    pub fn create_depth_framebuffer(&self, texture: &WebGlTexture) -> Result<WebGlFramebuffer, String> {
        let framebuffer = self.gl.create_framebuffer().ok_or("Failed to create framebuffer")?;
        self.gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&framebuffer));
        self.gl.framebuffer_texture_2d(
            GL::FRAMEBUFFER,
            GL::DEPTH_ATTACHMENT,
            GL::TEXTURE_2D,
            Some(texture),
            0,
        );

        let status = self.gl.check_framebuffer_status(GL::FRAMEBUFFER);
        self.gl.bind_framebuffer(GL::FRAMEBUFFER, None);
        if status != GL::FRAMEBUFFER_COMPLETE {
            self.gl.delete_framebuffer(Some(&framebuffer));
            return Err(format!("Depth framebuffer incomplete: {}", status));
        }
        Ok(framebuffer)
    }

    pub fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    pub fn set_int(&self, location: Option<&WebGlUniformLocation>, value: i32) {
        self.gl.uniform1i(location, value);
    }

    pub fn set_float(&self, location: Option<&WebGlUniformLocation>, value: f32) {
        self.gl.uniform1f(location, value);
    }

    pub fn set_vec2(&self, location: Option<&WebGlUniformLocation>, x: f32, y: f32) {
        self.gl.uniform2f(location, x, y);
    }

    pub fn set_vec3(&self, location: Option<&WebGlUniformLocation>, [x, y, z]: [f32; 3]) {
        self.gl.uniform3f(location, x, y, z);
    }

    pub fn set_mat4(&self, location: Option<&WebGlUniformLocation>, columns: &[f32; 16]) {
        self.gl.uniform_matrix4fv_with_f32_array(location, false, columns);
    }

    /// Reset per-frame state: viewport, clear color and depth, depth test on,
    /// blending off
    pub fn begin_frame(&self, width: i32, height: i32, [r, g, b]: [f32; 3]) {
        self.gl.viewport(0, 0, width, height);
        self.gl.clear_color(r, g, b, 1.0);
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        self.gl.enable(GL::DEPTH_TEST);
        self.gl.depth_func(GL::LEQUAL);
        self.gl.depth_mask(true);
        self.set_blending(false);
    }

    /// Toggle straight-alpha blending
    pub fn set_blending(&self, enabled: bool) {
        if enabled {
            self.gl.enable(GL::BLEND);
            self.gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
        } else {
            self.gl.disable(GL::BLEND);
        }
    }
}
