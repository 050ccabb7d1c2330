use std::io::Cursor;
use std::sync::Arc;

use chrono::NaiveTime;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::post::Post;
use crate::view::page::permalink;

/* Example
<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
  <title>My Blog</title>
  <link>https://blog.example.com</link>
  <description>Things I wrote</description>
  <item>
    <title>Hello World</title>
    <link>https://blog.example.com/2012/4/hello_world.html</link>
    <guid isPermaLink="true">https://blog.example.com/2012/4/hello_world.html</guid>
    <description><![CDATA[<p>Hi there.</p>]]></description>
    <pubDate>Sun, 15 Apr 2012 00:00:00 +0000</pubDate>
  </item>
</channel>
</rss>
*/

pub struct RssChannel<'a> {
    pub ch_title: &'a str,
    pub ch_link: &'a str,
    pub ch_desc: &'a str,
}

/// A post as it goes in the feed, with its body already rendered to HTML.
pub struct FeedItem<'a> {
    pub post: &'a Arc<Post>,
    pub rendered: String,
}

impl RssChannel<'_> {
    pub fn render(&self, items: &[FeedItem]) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        let decl = Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None));
        writer.write_event(decl)?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.ch_title)?;
        push_text(&mut writer, "link", self.ch_link)?;
        push_text(&mut writer, "description", self.ch_desc)?;

        for item in items {
            let post = item.post;
            writer.write_event(Event::Start(BytesStart::new("item")))?;

            push_text(&mut writer, "title", post.title())?;

            let link = permalink(self.ch_link, &post.create_url());
            push_text(&mut writer, "link", &link)?;

            let mut guid = BytesStart::new("guid");
            guid.push_attribute(("isPermaLink", "true"));
            writer.write_event(Event::Start(guid))?;
            writer.write_event(Event::Text(BytesText::new(&link)))?;
            writer.write_event(Event::End(BytesEnd::new("guid")))?;

            push_cdata(&mut writer, "description", &item.rendered)?;

            // Undated posts simply go without
            if let Some(date) = post.parsed_date() {
                let dt = date.and_time(NaiveTime::default()).and_utc();
                push_text(&mut writer, "pubDate", &dt.to_rfc2822())?;
            }

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Bodies containing `]]>` are split over several CDATA sections so they come out unchanged.
fn push_cdata(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        writer.write_event(Event::CData(BytesCData::new(&rest[..pos + 2])))?;
        rest = &rest[pos + 2..];
    }
    writer.write_event(Event::CData(BytesCData::new(rest)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
