use ggez::{
    graphics::{self, Color, DrawMode, DrawParam, Mesh, MeshBuilder, Rect},
    Context, GameResult,
};

use lang_compiler::Program;
use lang_component::Codel;

pub const CODEL_SIZE: f32 = 20.0;

const GRID_LINE: Color = Color::new(0.5, 0.5, 0.5, 1.0);
const POINTER: Color = Color::new(1.0, 0.4, 0.0, 1.0);

fn codel_rect(codel: Codel) -> Rect {
    Rect::new(
        codel.x as f32 * CODEL_SIZE,
        codel.y as f32 * CODEL_SIZE,
        CODEL_SIZE,
        CODEL_SIZE,
    )
}

/// Paints every codel, then outlines the one under the pointer.
pub fn draw(
    ctx: &mut Context,
    canvas: &mut graphics::Canvas,
    program: &Program,
    position: Option<Codel>,
) -> GameResult<()> {
    let grid = &program.grid;
    let mut mb = MeshBuilder::new();

    for codel in grid.codels() {
        let Some(color) = grid.get(codel) else {
            continue;
        };
        let (r, g, b) = color.rgb();
        let rect = codel_rect(codel);
        mb.rectangle(DrawMode::fill(), rect, Color::from_rgb(r, g, b))?;
        mb.rectangle(DrawMode::stroke(0.5), rect, GRID_LINE)?;
    }

    if let Some(codel) = position {
        mb.rectangle(DrawMode::stroke(3.0), codel_rect(codel), POINTER)?;
    }

    let mesh = Mesh::from_data(ctx, mb.build());
    canvas.draw(&mesh, DrawParam::default());

    Ok(())
}
