use crate::application::board::BoardService;

#[derive(Clone)]
pub struct HttpState {
    pub board: BoardService,
}

impl HttpState {
    pub fn new(board: BoardService) -> Self {
        Self { board }
    }
}
