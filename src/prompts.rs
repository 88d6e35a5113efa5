//! The fixed extraction prompt sent alongside every receipt image.
//!
//! The prompt is Japanese because the reimbursement workflow consuming the
//! artifacts is. It asks for payer, amount, ISO 4217 currency, payee,
//! category (lodging / transportation / other), an explanation and a warning,
//! and pins the fallback wording for unreadable fields.
//!
//! Downstream parsers key on the literal labels (`領収者氏名`, `警告`, …) and
//! on the fallback text `解析できませんでした`, so edits here are breaking
//! changes for them.

/// The receipt field-extraction prompt.
pub const RECEIPT_EXTRACTION_PROMPT: &str = "
画像は領収書を撮影したものです。領収者氏名、領収金額、領収通貨、支払い先、支払い内容を日本語で教えてください。
領収通貨は ISO 4217 の通貨名とコードで返してください。
支払い内容は、宿泊費ならば宿泊費、交通費ならば交通費、それ以外は任意とし、”警告”に「この請求書は宿泊費、交通費以外の可能性があります。」と記載してください。
また、宿泊費の場合でかつ、ミニバー、洗濯、その他個人の嗜好によるサービス利用料金が含まれる場合、”警告”に「清算対象外の費用（{内訳名称を記載}）が含まれている可能性があります。これらは補償対象外になる場合があります。」と記載してください。
宿泊費で上記以外の場合、”警告”に「なし」と記載してください。
解析結果の説明はJSONの説明に出力してください。
回答は下記フォーマットでJSONで回答してください。
    領収者氏名：空野太郎
    領収金額：100
    領収通貨：日本円
    支払い先：〇〇商事
    支払い内容：宿泊費
    説明：説明文
    警告：警告文
解析できない項目は、「解析できませんでした」と出力してください。
";
