use image::RgbImage;
use snapfen_core::{crop_resized, NormalizedBoard, BOARD_SQUARES, SQUARE_SIZE};

/// The 64 square bitmaps of a board in scan order: a8, b8, ..., h8, a7, ..., h1.
pub type SquareImages = [RgbImage; BOARD_SQUARES];

/// Cut the board into an 8x8 grid of `SQUARE_SIZE` bitmaps.
pub fn split_squares(board: &NormalizedBoard) -> SquareImages {
    let cell = board.cell_size();
    std::array::from_fn(|i| {
        let row = (i / 8) as u32;
        let col = (i % 8) as u32;
        crop_resized(board.image(), col * cell, row * cell, cell, cell, SQUARE_SIZE)
    })
}
