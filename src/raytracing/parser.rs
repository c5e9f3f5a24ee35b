use std::fmt;

use super::{
    camera::Camera,
    core::{LightModel, Lit, PlanePatch, Scene, ShadowScan, Shape, Sphere},
    Vec3,
};

pub struct SceneParser<'a> {
    content: &'a str,
    buffer: String,
    position: FilePosition,
}

#[derive(Debug, Clone, Copy)]
struct FilePosition {
    line: u32,
    column: u32,
    index: u32,
}

impl FilePosition {
    fn new() -> Self {
        FilePosition {
            line: 0,
            column: 0,
            index: 0,
        }
    }

    fn on_new_line(self: &mut Self) {
        self.line += 1;
        self.column = 0;
        self.index += 1;
    }

    fn advance(self: &mut Self) {
        self.column += 1;
        self.index += 1;
    }
}

#[derive(Debug)]
pub struct ParserError {
    position: FilePosition,
    pub message: String,
}

impl ParserError {
    fn new(message: &str, position: FilePosition) -> ParserError {
        ParserError {
            position,
            message: message.to_string(),
        }
    }

    pub fn print_error_location(self: &Self, content: &str) {
        println!("{}", self);
        if let Some(line) = content.lines().nth(self.position.line as usize) {
            println!("{}", line);
            let spacing = " ".repeat(self.position.column as usize);
            println!("{}^", spacing);
        }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.message, self.position.line, self.position.column
        )
    }
}

type ParserResult<T> = Result<T, ParserError>;

pub struct SceneData {
    pub width: u32,
    pub height: u32,
    pub camera: Camera,
    pub scene: Scene,
}

impl SceneParser<'_> {
    pub fn new<'a>(content: &'a str) -> SceneParser<'a> {
        SceneParser {
            content,
            position: FilePosition::new(),
            buffer: "".to_string(),
        }
    }

    fn get_current_char(self: &Self) -> Option<char> {
        self.content.chars().nth(self.position.index as usize)
    }

    fn is_empty(self: &Self) -> bool {
        self.get_current_char().is_none() && self.buffer.is_empty()
    }

    fn advance(self: &mut Self) -> bool {
        if let Some(current_char) = self.get_current_char() {
            if current_char == '\n' {
                self.position.on_new_line();
            } else {
                self.position.advance();
            }
            return true;
        }
        return false;
    }

    fn advance_until(self: &mut Self, f: impl Fn(char) -> bool) {
        while let Some(current_char) = self.get_current_char() {
            if f(current_char) {
                break;
            }
            self.advance();
        }
    }

    fn eat_spaces(self: &mut Self) {
        // consume all the empty lines, spaces and comments before the next token
        while let Some(current_char) = self.get_current_char() {
            // comments
            if current_char == '#' {
                // consume the characters until the end of the line
                // note: we don't consume the end-of-line here but at the end of the loop
                self.advance_until(|c| c == '\n');
            } else if !current_char.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn pop(self: &mut Self) -> String {
        // check if we already peeked without eating the next token
        if !self.buffer.is_empty() {
            let result = self.buffer.clone();
            self.buffer.clear();
            return result;
        }

        self.eat_spaces();
        let mut result = String::new();
        if self.get_current_char().is_none() {
            return result;
        }
        let mut current_char = self.get_current_char().unwrap();
        // add the current char to the result string and advance
        let enqueque = move |parser: &mut SceneParser, result: &mut String| {
            if let Some(current_char) = parser.get_current_char() {
                result.push(current_char);
                parser.advance();
            }
            if let Some(next_char) = parser.get_current_char() {
                return next_char;
            }
            return ' ';
        };

        match current_char {
            // if char is a symbol return it
            ',' | '(' | ')' | ':' => {
                self.advance();
                result.push(current_char);
            }
            // float parsing
            '.' | '+' | '-' | '0' | '1' | '2' | '3' | '4' | '5' | '6' | '7' | '8' | '9' => {
                if current_char == '+' || current_char == '-' {
                    current_char = enqueque(self, &mut result);
                }

                while current_char.is_digit(10) {
                    current_char = enqueque(self, &mut result);
                }

                if current_char == '.' {
                    current_char = enqueque(self, &mut result);
                    while current_char.is_digit(10) {
                        current_char = enqueque(self, &mut result);
                    }
                }
            }

            _ => {
                while current_char.is_alphabetic() {
                    current_char = enqueque(self, &mut result);
                }
            }
        }
        return result;
    }

    fn peek(self: &mut Self) -> &String {
        // peek always look ahead and save the result to the buffer
        if self.buffer.is_empty() {
            self.buffer = self.pop();
        }
        return &self.buffer;
    }

    fn error<T>(self: &mut Self, message: &str) -> ParserResult<T> {
        Err(ParserError::new(message, self.position))
    }

    fn parse_float(self: &mut Self) -> ParserResult<f64> {
        let next_token = self.pop();
        if let Ok(num) = next_token.parse::<f64>() {
            Ok(num)
        } else {
            let message = format!(
                "error parsing file: cannot interp '{}' as a float",
                next_token
            );
            self.error(&message)
        }
    }

    fn parse_stripe_width(self: &mut Self) -> ParserResult<i32> {
        let width = self.parse_float()?;
        if width.fract() != 0.0 {
            return self.error("stripe width must be a whole number");
        }
        Ok(width as i32)
    }

    fn match_token(self: &mut Self, expected_lexem: &str) -> ParserResult<()> {
        // match primitive: consume a lexem from the list and if is different
        // from the expected one raise an error
        let next_lexem = self.pop();
        if next_lexem != expected_lexem {
            let message = format!(
                "error parsing the scene file: expected '{}', getting '{}' instead",
                expected_lexem, next_lexem
            );
            self.error(&message)
        } else {
            Ok(())
        }
    }

    fn maybe_match(self: &mut Self, expected_lexem: &str) -> bool {
        // variant of match that can fail
        // if the expected lexem is the next in the stream, we consume it and returns true.
        // return false otherwise leaving the stream untouched
        let next_lexem = self.peek();
        if *next_lexem == expected_lexem {
            self.pop();
            return true;
        }
        return false;
    }

    fn parse_header(self: &mut Self) -> ParserResult<(f64, f64)> {
        self.match_token("size")?;
        let width = self.parse_float()?;
        let height = self.parse_float()?;
        Ok((width, height))
    }

    fn parse_vec3(self: &mut Self) -> ParserResult<Vec3> {
        self.match_token("(")?;
        let x = self.parse_float()?;
        self.match_token(",")?;
        let y = self.parse_float()?;
        self.match_token(",")?;
        let z = self.parse_float()?;
        self.match_token(")")?;
        return Ok(Vec3::new(x, y, z));
    }

    fn parse_color(self: &mut Self) -> ParserResult<Vec3> {
        // predefined color
        if self.maybe_match("red") {
            Ok(Vec3::new(1.0, 0.0, 0.0))
        } else if self.maybe_match("blue") {
            Ok(Vec3::new(0.0, 0.0, 1.0))
        } else if self.maybe_match("green") {
            Ok(Vec3::new(0.0, 1.0, 0.0))
        } else if self.maybe_match("white") {
            Ok(Vec3::new(1.0, 1.0, 1.0))
        } else if self.maybe_match("black") {
            Ok(Vec3::new(0.0, 0.0, 0.0))
        } else if self.maybe_match("grey") {
            Ok(Vec3::new(0.5, 0.5, 0.5))
        } else if self.maybe_match("violet") {
            Ok(Vec3::new(1.0, 0.0, 1.0))
        } else if self.maybe_match("yellow") {
            Ok(Vec3::new(1.0, 1.0, 0.0))
        } else if self.maybe_match("orange") {
            Ok(Vec3::new(0.98, 0.45, 0.02))
        } else {
            self.parse_vec3()
        }
    }

    fn parse_camera(&mut self) -> ParserResult<Camera> {
        if self.maybe_match("camera") {
            self.match_token("from")?;
            let position = self.parse_vec3()?;
            Ok(Camera::new(position))
        } else {
            Ok(Camera::new(Vec3::new(0.0, 0.0, -1000.0)))
        }
    }

    fn parse_light_model(self: &mut Self) -> ParserResult<LightModel> {
        if self.maybe_match("ambient") {
            Ok(LightModel::Ambient)
        } else if self.maybe_match("point") {
            Ok(LightModel::PointLight)
        } else if self.maybe_match("falloff") {
            let max_distance = self.parse_float()?;
            Ok(LightModel::Falloff { max_distance })
        } else {
            self.error("expected a lighting model: 'ambient', 'point' or 'falloff'")
        }
    }

    fn decorate(
        self: &mut Self,
        shape: Shape,
        model: Option<LightModel>,
        light: Option<Vec3>,
    ) -> ParserResult<Shape> {
        match model {
            Some(model) => {
                let light = match light {
                    Some(light) => light,
                    None => return self.error("a lit shape needs a 'light' declared before it"),
                };
                Ok(Shape::Lit(Lit {
                    inner: Box::new(shape),
                    light,
                    model,
                }))
            }
            None => Ok(shape),
        }
    }

    fn parse_sphere(self: &mut Self, light: Option<Vec3>) -> ParserResult<(Shape, bool)> {
        self.match_token("sphere")?;
        let center = self.parse_vec3()?;
        let radius = self.parse_float()?;
        let color = self.parse_color()?;
        let mut sphere = match Sphere::new(center, radius, color) {
            Ok(sphere) => sphere,
            Err(err) => return self.error(&err.to_string()),
        };

        let mut model = None;
        let mut casts_shadow = false;
        loop {
            if self.maybe_match("xstripe") {
                let color = self.parse_color()?;
                let width = self.parse_stripe_width()?;
                sphere = sphere.with_x_stripe(color, width);
            } else if self.maybe_match("ystripe") {
                let color = self.parse_color()?;
                let width = self.parse_stripe_width()?;
                sphere = sphere.with_y_stripe(color, width);
            } else if self.maybe_match("reflect") {
                let reflectivity = self.parse_float()?;
                sphere = sphere.with_reflectivity(reflectivity);
            } else if self.maybe_match("lit") {
                self.match_token(":")?;
                model = Some(self.parse_light_model()?);
            } else if self.maybe_match("shadow") {
                casts_shadow = true;
            } else {
                break;
            }
        }

        let shape = self.decorate(Shape::Sphere(sphere), model, light)?;
        Ok((shape, casts_shadow))
    }

    fn parse_plane(self: &mut Self, light: Option<Vec3>) -> ParserResult<(Shape, bool)> {
        self.match_token("plane")?;
        let corner_a = self.parse_vec3()?;
        let corner_b = self.parse_vec3()?;
        let corner_c = self.parse_vec3()?;
        let color = self.parse_color()?;
        let plane = match PlanePatch::new(corner_a, corner_b, corner_c, color) {
            Ok(plane) => plane,
            Err(err) => return self.error(&err.to_string()),
        };

        let mut model = None;
        let mut casts_shadow = false;
        loop {
            if self.maybe_match("lit") {
                self.match_token(":")?;
                model = Some(self.parse_light_model()?);
            } else if self.maybe_match("shadow") {
                casts_shadow = true;
            } else {
                break;
            }
        }

        let shape = self.decorate(Shape::Plane(plane), model, light)?;
        Ok((shape, casts_shadow))
    }

    pub fn parse_scene(self: &mut Self) -> ParserResult<SceneData> {
        // main routine that parse the whole file
        let (width, height) = self.parse_header()?;
        let camera = self.parse_camera()?;

        let mut background = Vec3::new(1.0, 0.0, 0.0);
        let mut light: Option<Vec3> = None;
        let mut objects = Vec::new();
        let mut shadow_casters = Vec::new();
        while !self.is_empty() {
            let next_token = self.peek();
            if next_token.is_empty() {
                // trailing whitespace or comments leave nothing to parse
                if self.get_current_char().is_none() {
                    break;
                }
                return self.error("unexpected character");
            }
            match next_token.as_str() {
                "background" => {
                    self.pop();
                    background = self.parse_color()?;
                }
                "light" => {
                    self.pop();
                    light = Some(self.parse_vec3()?);
                }
                "sphere" => {
                    let (shape, casts_shadow) = self.parse_sphere(light)?;
                    if casts_shadow {
                        shadow_casters.push(shape.clone());
                    }
                    objects.push(shape);
                }
                "plane" => {
                    let (shape, casts_shadow) = self.parse_plane(light)?;
                    if casts_shadow {
                        shadow_casters.push(shape.clone());
                    }
                    objects.push(shape);
                }
                _ => {
                    let message = format!("unexpected token '{}'", next_token);
                    return self.error(&message);
                }
            }
        }
        let scene = Scene {
            objects,
            shadow_casters,
            background,
            shadow_scan: ShadowScan::default(),
        };
        Ok(SceneData {
            width: width as u32,
            height: height as u32,
            camera,
            scene,
        })
    }
}
