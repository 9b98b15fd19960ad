//! Built-in topic list used when no topics file is configured.

/// Canonical literature works from the secondary-school curriculum.
pub const DEFAULT_TOPICS: &[&str] = &[
    "Ai đã đặt tên cho dòng sông",
    "Bài thơ về tiểu đội xe không kính",
    "Bánh trôi nước",
    "Bếp lửa",
    "Bình Ngô đại cáo",
    "Câu cá mùa thu",
    "Cảnh ngày xuân",
    "Chí Phèo",
    "Chị em Thúy Kiều",
    "Chiếc thuyền ngoài xa",
    "Chiều tối",
    "Chinh phụ ngâm",
    "Chữ người tử tù",
    "Chuyện người con gái Nam Xương",
    "Đăm Săn",
    "Đất Nước",
    "Đây thôn Vĩ Dạ",
    "Đồng chí",
    "Hai đứa trẻ",
    "Hạnh phúc của một tang gia",
    "Hồn Trương Ba, da hàng thịt",
    "Kiều ở lầu Ngưng Bích",
    "Lão Hạc",
    "Làng",
    "Lặng lẽ Sa Pa",
    "Mùa xuân nho nhỏ",
    "Người lái đò sông Đà",
    "Những đứa con trong gia đình",
    "Nói với con",
    "Ra-ma buộc tội",
    "Rừng xà nu",
    "Sang thu",
    "Sơn Tinh Thủy Tinh",
    "Số đỏ",
    "Sóng",
    "Tấm Cám",
    "Tây Tiến",
    "Thánh Gióng",
    "Thương vợ",
    "Tràng giang",
    "Trao duyên",
    "Truyện Kiều",
    "Tự tình",
    "Từ ấy",
    "Tuyên ngôn độc lập",
    "Uy-lít-xơ trở về",
    "Văn tế nghĩa sĩ Cần Giuộc",
    "Viếng lăng Bác",
    "Việt Bắc",
    "Vội vàng",
    "Vợ chồng A Phủ",
    "Vợ nhặt",
];
