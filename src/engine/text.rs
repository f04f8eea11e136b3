// ==========================================
// 码头配送整合系统 - 文本归一化辅助
// ==========================================
// 职责: 地址/描述匹配前的统一归一化 (小写 + 去重音)
// ==========================================

/// 归一化: 转小写并折叠常见拉丁重音字符
///
/// 关键字与城市名匹配一律先经过该函数,
/// 使 "São Paulo" 与 "sao paulo" 等价
pub(crate) fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
